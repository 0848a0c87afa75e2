//! Generator Version

/// Version stamped into every generated artifact header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
