//! Command: print version information.

/// Version string embedded at build time, or the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("SWAPLAUNCH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the launcher version to stdout.
pub fn run() {
    println!("swaplaunch {}", version());
}
