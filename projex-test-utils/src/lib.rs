//! Test helpers shared across the projex crates.

use std::sync::Once;

use tracing_subscriber::filter::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_TEST_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Install a fmt subscriber for test binaries. Safe to call from every test.
///
/// Output goes through the libtest capture, so logs only show for failing
/// tests or with `--nocapture`.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}
