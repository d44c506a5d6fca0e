//! Test utilities for the hognest workspace
//!
//! Shared fixtures, random forest generators and nested-set assertions used by
//! the integration tests of the other crates.
//!
//! # Features
//!
//! - **Test Environment**: temporary input/output directories with cleanup
//! - **Fixtures**: small curated forests and seeded random forests
//! - **Assertions**: checks for the nested-set and association invariants

pub mod assertions;
pub mod environment;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::{assert_associations_resolved, assert_nested_set, assert_subtree_sizes};
pub use environment::{TestConfig, TestEnvironment};
pub use fixtures::{primate_catalog, primate_forest, primate_sharing, random_forest, ForestShape};

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
///
/// Output goes through the test writer so it is captured per test; the level
/// follows `HOGNEST_LOG`, falling back to `debug`.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HOGNEST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Run a test with a clean environment
///
/// # Example
/// ```rust
/// use hognest_test::with_test_env;
///
/// with_test_env(|env| {
///     let path = env.write_input("catalog.tsv", b"HUMAN00001\n")?;
///     assert!(path.exists());
///     Ok(())
/// })
/// .unwrap();
/// ```
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
