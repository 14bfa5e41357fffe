//! Console logging setup shared by both binaries.
//!
//! Priority: RUST_LOG env var > `--debug` flag > `logging.level` from
//! settings.yaml > "info". Output goes to stderr so stdout stays free for
//! the completion messages.
//!
//! Logging starts before the settings file is read, so problems loading it
//! are visible. The configured level is applied afterwards through
//! [`LogHandle::apply_config_level`].

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::constants;

pub struct LogHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
    /// RUST_LOG or --debug already decided the level
    pinned: bool,
}

pub fn init(debug_flag: bool) -> LogHandle {
    let env_set = std::env::var("RUST_LOG").is_ok();
    let filter = if env_set {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(constants::logging::DEFAULT_LOG_LEVEL)
    };

    let (filter_layer, handle) = reload::Layer::new(filter);

    // try_init: tests and repeated calls must not panic on an installed subscriber
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .is_ok();

    tracing::debug!(
        app = constants::app::APP_NAME,
        version = constants::app::APP_VERSION,
        "Logging initialised"
    );

    LogHandle {
        reload: installed.then_some(handle),
        pinned: env_set || debug_flag,
    }
}

impl LogHandle {
    /// Switch to the level from settings.yaml unless RUST_LOG or --debug is in effect.
    pub fn apply_config_level(&self, level: &str) {
        if self.pinned {
            return;
        }
        let Some(handle) = &self.reload else {
            return;
        };

        if let Err(e) = handle.reload(EnvFilter::new(level)) {
            tracing::warn!(level, error = %e, "Failed to apply configured log level");
        }
    }
}
