//! Version numbers and constraint intervals for the dependency solver.
//!
//! This crate implements a total order over `(major, minor, patch)`
//! triples and a half-open constraint interval algebra closed under
//! intersection.

mod constraint;
mod error;
mod version;

pub use self::constraint::{Constraint, Op};
pub use self::error::Error;
pub use self::version::Version;

pub type Result<T> = std::result::Result<T, Error>;
