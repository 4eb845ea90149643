use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Level used when `RUST_LOG` does not say otherwise
pub fn default_level(verbose: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Compact logs on stderr so stdout carries only command output
pub fn init_logging(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    register_panic_logger();
    report_build_info();
}

/// Registers a panic hook that logs panics using the `tracing` crate
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

fn report_build_info() {
    let build = common::build_info!();

    tracing::debug!(
        build_profile = build.build_profile,
        features = build.build_features,
        version = build.version,
        "zkcli starting up"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), LevelFilter::WARN);
        assert_eq!(default_level(true, false), LevelFilter::INFO);
        assert_eq!(default_level(false, true), LevelFilter::DEBUG);
        assert_eq!(default_level(true, true), LevelFilter::DEBUG);
    }
}
