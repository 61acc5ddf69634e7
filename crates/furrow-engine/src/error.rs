//! Error types for the replay host binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the replay
//! loop so `main` can propagate with `?`.

/// Top-level error for the replay host.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: furrow_core::config::ConfigError,
    },

    /// The logical clock ran out of ticks.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: furrow_core::clock::ClockError,
    },

    /// Profiles could not be read at startup.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: furrow_core::storage::StorageError,
    },

    /// The replay script could not be loaded.
    #[error("script error: {source}")]
    Script {
        /// The underlying script error.
        #[from]
        source: crate::script::ScriptError,
    },
}
