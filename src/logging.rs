use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KIRA_LOG";

/// Installs the stderr subscriber. `KIRA_LOG` wins over `RUST_LOG`; both
/// fall back to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
