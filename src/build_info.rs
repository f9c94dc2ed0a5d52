//! Compile-time build metadata exposed to the CLI.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("TALLY_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("TALLY_BUILD_TIMESTAMP");

/// Version block shown by `tally --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("TALLY_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("TALLY_BUILD_TIMESTAMP")
);
