/// Router Module Index
///
/// Two groups, merged in `create_router`. The explicit routes win over the
/// page pipeline because the pipeline is only mounted as the fallback.

/// Fixed endpoints: health check, diagnostics, actions, logout.
pub mod public;

/// The page pipeline: everything no explicit route claims.
pub mod pages;
