//! Shared setup for integration tests

/// Route `log` output into the test harness. Safe to call from every test;
/// only the first call per binary installs the logger.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}
