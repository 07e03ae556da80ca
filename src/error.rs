//! Error types
//!
//! Model and lifecycle operations return [`NetworkError`]. Id parsing failures
//! are kept as [`ReferenceError`] and converted with `?`. Transport failures
//! arrive as `anyhow::Error` from the ARM client and are passed through
//! untouched.

use crate::resource::ReferenceError;

/// Errors raised by resource models and their lifecycle verbs
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("{kind} '{name}' not found")]
    ChildNotFound { kind: &'static str, name: String },

    #[error("{resource} is missing required field '{field}'")]
    MissingField { resource: String, field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("frontend port {port} clashes with existing port '{existing}'")]
    PortConflict { port: u16, existing: String },

    #[error("{0} has no IP configuration to derive a subnet from")]
    NoIpConfiguration(String),

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("failed to decode {what} from the wire representation")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what} into the wire representation")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl NetworkError {
    pub(crate) fn missing(resource: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            resource: resource.into(),
            field,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the transport rather than the model
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result alias used across the model layer
pub type Result<T, E = NetworkError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_error_converts() {
        fn parse() -> Result<()> {
            crate::resource::leaf_name_from_id("")?;
            Ok(())
        }
        let err = parse().unwrap_err();
        assert!(matches!(err, NetworkError::InvalidReference(ReferenceError::Empty)));
        assert_eq!(err.to_string(), "invalid reference: resource id is empty");
    }

    #[test]
    fn test_messages() {
        let err = NetworkError::ChildNotFound {
            kind: "backend",
            name: "pool1".into(),
        };
        assert_eq!(err.to_string(), "backend 'pool1' not found");

        let err = NetworkError::missing("network security rule 'r1'", "priority");
        assert_eq!(
            err.to_string(),
            "network security rule 'r1' is missing required field 'priority'"
        );
        assert!(!err.is_transport());
        assert!(NetworkError::from(anyhow::anyhow!("boom")).is_transport());
    }
}
