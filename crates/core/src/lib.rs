//! Shared data model for the language-intelligence core.
//!
//! Every other crate in the workspace builds on the types exposed here:
//! the parsed [`Tree`]/[`Node`] shape, the per-file [`TreeContainer`], the
//! module-level index types, and the [`Error`] enum every fallible
//! operation in the workspace returns.

mod binding;
mod cancellation;
mod empty_types;
mod error;
mod host_sink;
mod import;
mod module;
mod node;
mod position;
mod reference;
mod tree_container;
mod uri;

pub use self::binding::{Associativity, BindingKind, TopLevelBinding};
pub use self::cancellation::{CancellationSource, CancellationToken};
pub use self::empty_types::{empty_types, EmptyType};
pub use self::error::Error;
pub use self::host_sink::HostSink;
pub use self::import::ResolvedImport;
pub use self::module::{ConstructorExposure, ExposedItem, ExposingSet, ModuleName};
pub use self::node::{Node, NodeKind, Tree};
pub use self::position::{ByteRange, Position};
pub use self::reference::{DefinitionNode, DefinitionNodeType, Reference, ReferenceKind};
pub use self::tree_container::TreeContainer;
pub use self::uri::FileUri;

pub type Result<T> = std::result::Result<T, Error>;
