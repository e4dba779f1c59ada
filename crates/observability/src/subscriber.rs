//! JSON tracing subscriber.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or from `default_directives` when it is unset or
/// unparsable.
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init(default_directives: &str) -> bool {
    // JSON logs + timestamps, configurable via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directives))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let _ = init("debug");
        assert!(!init("debug"));
    }
}
