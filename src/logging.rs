//! Logging setup
//!
//! The crate logs through the `log` facade. Binaries call [`init`] once; tests use
//! [`init_for_tests`], which tolerates repeated initialisation.

pub use log::{debug, error, info, trace, warn};

/// Initialise `env_logger`, honouring `RUST_LOG` and defaulting to `info`
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initialise a test logger; safe to call from every test
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
