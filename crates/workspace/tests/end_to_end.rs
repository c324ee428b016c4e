//! End-to-end scenarios exercising the full `WorkspaceHandle` facade:
//! manifest loading, dependency solving, and resolver queries wired
//! together the way a host actually drives them.

use anyhow::Result;
use limn_core::{CancellationToken, DefinitionNodeType, FileUri, Position};
use limn_workspace::{FileChange, WorkspaceHandle, MANIFEST_FILE};
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("limn-workspace-e2e-{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("src")).unwrap();
    dir
}

fn write_manifest(dir: &Path, name: &str) {
    fs::write(dir.join(MANIFEST_FILE), format!("[package]\nname = \"{}\"\n", name)).unwrap();
}

fn position_at(source: &str, offset: usize) -> Position {
    let mut row = 0u32;
    let mut last_line_start = 0usize;
    for (index, ch) in source.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            row += 1;
            last_line_start = index + 1;
        }
    }
    Position::new(row, (offset - last_line_start) as u32)
}

/// A single-file definition resolves, and its only reference is its own
/// occurrence (plus the module's re-exposure).
#[test]
fn single_file_definition() -> Result<()> {
    let dir = scratch_dir("scenario-1");
    write_manifest(&dir, "author/a");
    fs::write(dir.join("src/A.limn"), b"module A exposing (x)\nx = 1\n")?;

    let workspace = WorkspaceHandle::load_workspace(&dir)?;
    let uri = FileUri::from_path(dir.join("src/A.limn")).unwrap();
    let source = workspace.get_tree(&uri).unwrap().tree.source().to_string();
    let offset = source.rfind("x = 1").unwrap();

    let definition = workspace
        .find_definition(&uri, position_at(&source, offset))
        .expect("x should resolve to its own value declaration");
    assert_eq!(definition.node_type, DefinitionNodeType::Value);
    assert_eq!(definition.node.text(), "x");

    let references = workspace.find_references(&definition, &CancellationToken::never())?;
    assert_eq!(references.len(), 2);

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

/// A cross-file use is found, and disappears once the defining module
/// stops exposing the name.
#[test]
fn cross_file_reference_tracks_exposure_changes() -> Result<()> {
    let dir = scratch_dir("scenario-2");
    write_manifest(&dir, "author/a");
    fs::write(dir.join("src/A.limn"), b"module A exposing (x)\nx = 1\n")?;
    fs::write(
        dir.join("src/B.limn"),
        b"module B exposing (..)\nimport A exposing (x)\ny = x + 1\n",
    )?;

    let mut workspace = WorkspaceHandle::load_workspace(&dir)?;
    let a_uri = FileUri::from_path(dir.join("src/A.limn")).unwrap();
    let b_uri = FileUri::from_path(dir.join("src/B.limn")).unwrap();

    let a_source = workspace.get_tree(&a_uri).unwrap().tree.source().to_string();
    let offset = a_source.rfind("x = 1").unwrap();
    let definition = workspace.find_definition(&a_uri, position_at(&a_source, offset)).unwrap();

    let references = workspace.find_references(&definition, &CancellationToken::never())?;
    assert!(references.iter().any(|r| r.uri == b_uri));

    workspace.apply_file_change(a_uri.clone(), FileChange::Updated(b"module A exposing ()\nx = 1\n".to_vec()))?;
    let definition = workspace.find_definition(&a_uri, position_at(&a_source, offset)).unwrap();
    let references = workspace.find_references(&definition, &CancellationToken::never())?;
    assert!(references.iter().all(|r| r.uri == a_uri));

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

/// A qualified reference through an aliased import splits into
/// `(module, name)` and resolves across files.
#[test]
fn qualified_import_with_alias() -> Result<()> {
    let dir = scratch_dir("scenario-3");
    write_manifest(&dir, "author/a");
    fs::write(dir.join("src/A.limn"), b"module A exposing (x)\nx = 1\n")?;
    fs::write(
        dir.join("src/B.limn"),
        b"module B exposing (..)\nimport A as Q\ny = Q.x\n",
    )?;

    let workspace = WorkspaceHandle::load_workspace(&dir)?;
    let b_uri = FileUri::from_path(dir.join("src/B.limn")).unwrap();
    let b_source = workspace.get_tree(&b_uri).unwrap().tree.source().to_string();
    let offset = b_source.rfind("Q.x").unwrap() + 2;

    let definition = workspace
        .find_definition(&b_uri, position_at(&b_source, offset))
        .expect("Q.x should split to (A, x) and resolve to A's definition");

    let a_uri = FileUri::from_path(dir.join("src/A.limn")).unwrap();
    assert_eq!(definition.uri, a_uri);
    assert_eq!(definition.node.text(), "x");

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

/// A workspace whose manifest declares a dependency that can't be solved
/// still loads with its own project files usable.
#[test]
fn unsolvable_dependencies_degrade_to_project_only() -> Result<()> {
    let dir = scratch_dir("scenario-unsolvable");
    fs::write(
        dir.join(MANIFEST_FILE),
        "[package]\nname = \"author/a\"\n\n[dependencies]\n\"author/missing\" = \">=1.0.0 <2.0.0\"\n",
    )?;
    fs::write(dir.join("src/A.limn"), b"module A exposing (..)\nx = 1\n")?;

    let workspace = WorkspaceHandle::load_workspace(&dir)?;
    assert!(workspace.solution().is_empty());
    assert_eq!(workspace.get_forest().len(), 1);

    fs::remove_dir_all(&dir).ok();
    Ok(())
}
