use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "CLASS_DEPEND_LOG";

static INIT: Once = Once::new();

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "class_depend=debug"
    } else {
        "class_depend=warn"
    }
}

/// Installs the stderr subscriber. Only the first call has an effect.
///
/// `CLASS_DEPEND_LOG` wins over `verbose` when it holds a valid directive.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
