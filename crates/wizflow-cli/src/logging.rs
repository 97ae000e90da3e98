//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;
use wizflow_flow::LogConfig;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `config.filter` unless `prefer_config` is set (an
/// explicit `--log`). Logs go to stderr so command output stays clean.
///
/// # Errors
/// Returns error if the filter does not parse or a subscriber is already
/// installed.
pub fn init_tracing(config: &LogConfig, prefer_config: bool) -> anyhow::Result<()> {
    let filter = if prefer_config {
        EnvFilter::try_new(&config.filter)?
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&config.filter)?,
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
