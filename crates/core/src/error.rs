use thiserror::Error;

/// The workspace's error kinds.
///
/// `ParseFailure` intentionally has no variant here: a failed parse is
/// never surfaced as an error, only recorded as `ERROR` nodes in the
/// tree that failed to parse cleanly. `UnresolvedReference` and
/// `Cancelled` likewise only ever show up wrapped in this type when a
/// caller chooses to propagate them with `?`; the resolver's own query
/// surface returns `Option`/`Vec` directly instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("project misconfigured: {0}")]
    ProjectMisconfigured(String),

    #[error("unknown package: {0}")]
    UnknownPackage(String),

    #[error("no dependency assignment satisfies all constraints")]
    Unsolvable,

    #[error("reference could not be resolved")]
    UnresolvedReference,

    #[error("query was cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
