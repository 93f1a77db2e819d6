//! Logging bootstrap

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. "info" or "scambuster=debug").
///
/// Returns false when a global subscriber was already installed, which makes
/// repeated calls from tests harmless.
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        let _ = init_logging("debug");
        assert!(!init_logging("info"));
    }
}
