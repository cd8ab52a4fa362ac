/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Rejected input (empty playlist name, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error in {file}: {source}")]
    Serialization {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<StorageError> for amorlist_core::AmorError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::InvalidInput(msg) => Self::InvalidInput(msg),
            StorageError::Io(e) => Self::Io(e),
            other @ StorageError::Serialization { .. } => Self::storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amorlist_core::AmorError;

    #[test]
    fn not_found_keeps_its_kind() {
        let err: AmorError = StorageError::not_found("Playlist", "pl_x").into();
        assert!(err.is_not_found());
    }

    #[test]
    fn serialization_becomes_storage_error() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: AmorError = StorageError::Serialization {
            file: "stats.json".to_string(),
            source,
        }
        .into();
        assert!(matches!(err, AmorError::Storage(msg) if msg.contains("stats.json")));
    }
}
