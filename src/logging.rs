//! Logger bootstrap for the simulation binary and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, every state transition and sensing decision is
/// printed at debug level. Otherwise only info level and above are shown.
/// `RUST_LOG` overrides either default.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // Only fails when a logger is already installed, which repeated test
    // set-up does routinely.
    if let Err(err) = builder.try_init() {
        log::trace!("logger already initialised: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
        log::debug!("logger survived repeated initialisation");
    }
}
