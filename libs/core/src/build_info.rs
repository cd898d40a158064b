//! Build metadata captured by `build.rs`.

/// Short git commit hash, suffixed with `-dirty` for uncommitted trees.
pub const GIT_HASH: &str = env!("SEDB_GIT_HASH");

/// Build timestamp (RFC 3339, UTC).
pub const BUILD_TIMESTAMP: &str = env!("SEDB_BUILD_TIMESTAMP");

/// Crate version shared by the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string for `--version` output: `0.1.0 (abc1234, 2026-01-01T00:00:00Z)`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SEDB_GIT_HASH"),
    ", ",
    env!("SEDB_BUILD_TIMESTAMP"),
    ")"
);
