//! Error types for the levelup_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for levelup_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file parsed but holds unusable values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Exercise catalog failed validation
    #[error("Catalog validation error: {0}")]
    Catalog(String),

    /// Weekly plan is missing or malformed
    #[error("Plan error: {0}")]
    Plan(String),

    /// Workout session transition not allowed in the current state
    #[error("Session error: {0}")]
    Session(String),

    /// A persistence backend rejected a read or write
    #[error("Store error: {0}")]
    Store(String),

    /// Text that doesn't name a known enum value (rating, gender, ...)
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Error::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_value_message() {
        let err = Error::unknown("rating", "meh");
        assert_eq!(err.to_string(), "Unknown rating: 'meh'");
    }

    #[test]
    fn test_io_conversion() {
        fn open_missing() -> Result<()> {
            std::fs::File::open("/definitely/not/here/levelup.json")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(Error::Io(_))));
    }
}
