//! Maintains the forest of parsed trees keyed by file URI and extracts
//! each tree's module index.

mod forest;
mod module_index;

pub use self::forest::Forest;
pub use self::module_index::{dotted_name, extract_module_header, extract_top_level_bindings, ModuleHeader};
