//! Logging initialization.

use env_logger::Env;

/// Initialize logging; RUST_LOG overrides the default warn filter.
pub fn init() {
    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();
}
