//! # Storefront Testing
//!
//! Testing utilities and helpers for the storefront client.
//!
//! This crate provides:
//! - Deterministic implementations of the core environment traits
//! - A Given-When-Then builder for reducer tests
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{test_clock, RecordingNavigator};
//!
//! #[tokio::test]
//! async fn test_expired_token_redirects() {
//!     let navigator = RecordingNavigator::new();
//!     let client = ApiClient::new(url, storage, navigator.clone());
//!
//!     let _ = client.get_cart().await;
//!
//!     assert_eq!(navigator.redirects(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use storefront_core::environment::{Clock, Navigator};


/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Navigator, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// Navigator that counts login redirects instead of navigating
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNavigator {
        redirects: Arc<AtomicUsize>,
    }

    impl RecordingNavigator {
        /// Create a navigator with no recorded redirects
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// How many times `redirect_to_login` was called
        #[must_use]
        pub fn redirects(&self) -> usize {
            self.redirects.load(Ordering::SeqCst)
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect_to_login(&self) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Test helpers
pub mod helpers {
    /// Install a test-friendly tracing subscriber
    ///
    /// Output is captured by the test harness; repeated calls are no-ops.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use mocks::{test_clock, FixedClock, RecordingNavigator};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_recording_navigator_shares_count_across_clones() {
        let navigator = RecordingNavigator::new();
        let clone = navigator.clone();

        clone.redirect_to_login();
        navigator.redirect_to_login();

        assert_eq!(navigator.redirects(), 2);
    }
}
