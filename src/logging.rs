use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "toolhub_client=info";

/// Install the fmt subscriber on stderr. `RUST_LOG` overrides
/// `default_filter`. Calling this twice is harmless.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
