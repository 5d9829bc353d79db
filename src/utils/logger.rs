use crate::transport::TransportMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "template_base=info";
const VERBOSE_FILTER: &str = "template_base=debug,info";

/// `RUST_LOG` wins over the built-in filter.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

/// Compact lines on a terminal, one JSON object per event under Lambda.
pub fn init_logger(mode: TransportMode, verbose: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    let layer = tracing_subscriber::fmt::layer().with_target(false);

    match mode {
        TransportMode::Server => registry.with(layer.compact()).init(),
        // CloudWatch 會自行加上時間戳
        TransportMode::Function => registry
            .with(
                layer
                    .without_time()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false),
            )
            .init(),
    }
}
