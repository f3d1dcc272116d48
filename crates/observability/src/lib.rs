//! Process-wide logging setup shared by the binaries.

/// Initialize tracing for the process.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, JSON layer).
pub mod tracing;
