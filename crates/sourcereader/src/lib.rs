//! Locates, reads, and watches project and dependency source files.

mod reader;
mod watch;

pub use self::reader::{enumerate_dependency, enumerate_project, SourceFile, SOURCE_EXTENSION};
pub use self::watch::{ChangeEvent, ChangeKind, SourceWatcher};
