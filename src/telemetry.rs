//! Logging initialisation for the binary.
//!
//! Controlled by `GITKIT_LOG`, using `EnvFilter` directives
//! (`GITKIT_LOG=debug`, `GITKIT_LOG=gitkit::areas=trace`). Unset means `warn`.
//! Events go to stderr so they never mix with command output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV_VAR: &str = "GITKIT_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

pub fn init() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // a second init (e.g. from a test harness) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
