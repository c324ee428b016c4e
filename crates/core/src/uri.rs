use std::fmt;
use std::path::Path;
use url::Url;

/// An opaque absolute identifier for a source file.
///
/// Two `FileUri`s compare equal iff they denote the same file; callers
/// should not otherwise inspect the inner representation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileUri(Url);

impl FileUri {
    /// Build a `FileUri` from an absolute filesystem path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<FileUri> {
        Url::from_file_path(path).ok().map(FileUri)
    }

    /// Build a `FileUri` from an already-absolute `file://` (or other
    /// scheme) URL string, as delivered by an editor protocol layer.
    pub fn parse(raw: &str) -> Option<FileUri> {
        Url::parse(raw).ok().map(FileUri)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The local filesystem path, if this URI uses the `file` scheme.
    pub fn to_file_path(&self) -> Option<std::path::PathBuf> {
        self.0.to_file_path().ok()
    }
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        let uri = FileUri::from_path("/workspace/src/A.limn").unwrap();
        let parsed = FileUri::parse(&uri.to_string()).unwrap();
        assert_eq!(uri, parsed);
    }

    #[test]
    fn distinct_paths_are_distinct_uris() {
        let a = FileUri::from_path("/workspace/src/A.limn").unwrap();
        let b = FileUri::from_path("/workspace/src/B.limn").unwrap();
        assert_ne!(a, b);
    }
}
