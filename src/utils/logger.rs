use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "face_auth_helpers=info";
const VERBOSE_DIRECTIVES: &str = "face_auth_helpers=debug,info";

/// `RUST_LOG` when set and parseable, otherwise the crate defaults.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_DIRECTIVES
        } else {
            DEFAULT_DIRECTIVES
        })
    })
}

/// Compact text logging for local runs and tests.
///
/// Returns `false` when a global subscriber was already installed, so a
/// handler can call it on every cold start without panicking.
pub fn init_local_logger(verbose: bool) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
        .is_ok()
}

/// JSON logging for CloudWatch. Lambda stamps each line, so no timestamp.
pub fn init_lambda_logger() -> bool {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .json()
                .with_current_span(false),
        )
        .try_init()
        .is_ok()
}
