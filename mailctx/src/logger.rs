// mailctx/src/logger.rs
//! Logger setup for the mailctx binary.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger` on stderr.
///
/// `RUST_LOG` is honored unless `level_override` is given; the default level is `warn`,
/// so rejected logo URLs are reported without any flags. Calling this more than once is a
/// no-op.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.target(env_logger::Target::Stderr);
    builder.format_timestamp(None);
    let _ = builder.try_init();
}
