use limn_core::{Error, FileUri};
use log::warn;
use std::path::Path;
use walkdir::WalkDir;

/// The extension recognized as a Limn source file.
pub const SOURCE_EXTENSION: &str = "limn";

/// A file delivered by the source reader, ready to hand to the forest.
pub struct SourceFile {
    pub uri: FileUri,
    pub bytes: Vec<u8>,
    pub writeable: bool,
}

/// Enumerate every `.limn` file under the project's declared source
/// directories.
///
/// A missing source directory is `ProjectMisconfigured`; a read error on
/// an individual file is logged and that file is excluded rather than
/// failing the whole enumeration.
pub fn enumerate_project(
    root: &Path,
    source_directories: &[String],
) -> Result<Vec<SourceFile>, Error> {
    let mut files = Vec::new();

    for relative in source_directories {
        let dir = root.join(relative);
        if !dir.is_dir() {
            return Err(Error::ProjectMisconfigured(format!(
                "source directory not found: {}",
                dir.display()
            )));
        }
        files.extend(read_source_tree(&dir, true));
    }

    Ok(files)
}

/// Enumerate the source directories of a solved dependency. Dependency
/// source is always read-only.
pub fn enumerate_dependency(root: &Path, source_directories: &[String]) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for relative in source_directories {
        let dir = root.join(relative);
        if !dir.is_dir() {
            warn!("dependency source directory not found: {}", dir.display());
            continue;
        }
        files.extend(read_source_tree(&dir, false));
    }
    files
}

fn read_source_tree(dir: &Path, writeable: bool) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(error) => {
            warn!("failed to walk {}: {}", dir.display(), error);
            None
        }
    }) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }

        match std::fs::read(path) {
            Ok(bytes) => match FileUri::from_path(path) {
                Some(uri) => files.push(SourceFile { uri, bytes, writeable }),
                None => warn!("could not build a file uri for {}", path.display()),
            },
            Err(error) => warn!("failed to read {}: {}", path.display(), error),
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_source_directory_is_project_misconfigured() {
        let tmp = std::env::temp_dir().join("limn-sourcereader-test-missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let result = enumerate_project(&tmp, &["src".to_string()]);
        assert!(matches!(result, Err(Error::ProjectMisconfigured(_))));

        fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn enumerates_limn_files_and_skips_others() {
        let tmp = std::env::temp_dir().join("limn-sourcereader-test-enumerate");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("src")).unwrap();
        fs::write(tmp.join("src/Main.limn"), b"module Main exposing (..)\n").unwrap();
        fs::write(tmp.join("src/notes.txt"), b"ignored").unwrap();

        let files = enumerate_project(&tmp, &["src".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].writeable);

        fs::remove_dir_all(&tmp).ok();
    }
}
