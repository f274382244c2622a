//! Error types for reconciliation.
//!
//! Errors are categorized so callers can tell drift from failure and
//! decide on retries themselves. The engine never retries on its own.

use std::fmt;
use thiserror::Error;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Desired value failed a property validator
    Validation,
    /// Target record is absent on the device
    NotFound,
    /// Change requires destroying and recreating the instance
    Conflict,
    /// Device refused a write
    Rejected,
    /// Connectivity or authentication failure
    Transport,
    /// Device value could not be decoded
    Decode,
    /// Resource kind or descriptor problem
    Schema,
    /// Operation was cancelled by the caller
    Cancelled,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    ///
    /// The engine itself does not retry; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid desired value",
            Self::NotFound => "Not found on device",
            Self::Conflict => "Requires replacement",
            Self::Rejected => "Rejected by device",
            Self::Transport => "Device unreachable",
            Self::Decode => "Unreadable device value",
            Self::Schema => "Unknown or invalid resource kind",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Fix the property value in your configuration",
            Self::NotFound => "The instance drifted away; re-create it or import the right identity",
            Self::Conflict => "Destroy and re-create the instance to change write-once properties",
            Self::Rejected => "Check the device message; the value may be invalid for the current mode",
            Self::Transport => "Check the device address, credentials and connectivity",
            Self::Decode => "The device firmware may report this property differently",
            Self::Schema => "Run `roscfg kinds` to list supported resource kinds",
            Self::Cancelled => "Re-run the operation; the device may be partially updated",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A desired value that failed validation. Raised before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{property}: {message}")]
pub struct ValidationError {
    /// Property the value was given for
    pub property: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// A device value that could not be decoded against its descriptor type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{property} = {raw:?}: {message}")]
pub struct DecodeError {
    /// Property name
    pub property: String,
    /// Raw wire value as returned by the device
    pub raw: String,
    /// Why it failed
    pub message: String,
}

/// Errors returned by the engine to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more desired values failed validation
    #[error("invalid {kind}: {}", join_validation(.errors))]
    Validation {
        /// Resource kind being validated
        kind: String,
        /// Every failure found, in property order
        errors: Vec<ValidationError>,
    },

    /// No record matches the identity
    #[error("no record at {path} matching '{identity}'")]
    NotFound {
        /// Device collection path
        path: String,
        /// Identity that was looked up
        identity: String,
    },

    /// Update touches write-once properties; destroy and recreate instead
    #[error("{kind} '{identity}' must be replaced to change {}", .properties.join(", "))]
    ConflictForceNew {
        /// Resource kind
        kind: String,
        /// Identity of the instance
        identity: String,
        /// Write-once properties that changed
        properties: Vec<String>,
    },

    /// Device refused an add, set or remove
    #[error("device rejected change at {path}{}: {message}", property_suffix(.property))]
    RemoteRejected {
        /// Device collection path
        path: String,
        /// Property whose change was refused, when known
        property: Option<String>,
        /// Device message, verbatim
        message: String,
    },

    /// Connectivity or authentication failure
    #[error("transport error: {message}")]
    Transport {
        /// Underlying failure
        message: String,
    },

    /// The identity value of a record could not be decoded. Other decode
    /// failures stay on [`crate::Observed::decode_errors`].
    #[error("cannot decode {0}")]
    Decode(#[from] DecodeError),

    /// Resource kind is not registered
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    /// Descriptor is malformed
    #[error("invalid descriptor for {kind}: {message}")]
    Schema {
        /// Resource kind
        kind: String,
        /// What is wrong
        message: String,
    },

    /// Operation was cancelled before completion
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error for a collection path.
    pub fn rejected(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            path: path.into(),
            property: None,
            message: message.into(),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::ConflictForceNew { .. } => ErrorCategory::Conflict,
            Error::RemoteRejected { .. } => ErrorCategory::Rejected,
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::Decode(_) => ErrorCategory::Decode,
            Error::UnknownKind(_) | Error::Schema { .. } => ErrorCategory::Schema,
            Error::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether the error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Attach the property whose list change was refused.
    pub(crate) fn for_property(self, name: &str) -> Self {
        match self {
            Error::RemoteRejected { path, message, .. } => Error::RemoteRejected {
                path,
                property: Some(name.to_string()),
                message,
            },
            other => other,
        }
    }
}

fn property_suffix(property: &Option<String>) -> String {
    property
        .as_deref()
        .map(|p| format!(" ({p})"))
        .unwrap_or_default()
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(ErrorCategory::Transport.is_retryable());
        assert!(!ErrorCategory::Rejected.is_retryable());
        assert!(!ErrorCategory::Conflict.is_retryable());
        assert!(!ErrorCategory::Validation.is_retryable());
        assert!(!ErrorCategory::Cancelled.is_retryable());
    }

    #[test]
    fn test_validation_display_lists_every_failure() {
        let err = Error::Validation {
            kind: "interface_bonding".to_string(),
            errors: vec![
                ValidationError::new("mode", "must be one of: none, dynamic-keys"),
                ValidationError::new("mtu", "must be between 0 and 65535"),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("interface_bonding"));
        assert!(display.contains("mode: must be one of"));
        assert!(display.contains("mtu: must be between"));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_rejected_for_property() {
        let err = Error::rejected("/interface/bonding", "input does not match any value of slaves")
            .for_property("slaves");
        match &err {
            Error::RemoteRejected { property, .. } => {
                assert_eq!(property.as_deref(), Some("slaves"));
            }
            _ => panic!("Expected Error::RemoteRejected"),
        }
        assert!(err.to_string().contains("(slaves)"));
    }

    #[test]
    fn test_for_property_leaves_other_errors() {
        let err = Error::transport("connection reset").for_property("slaves");
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_conflict_display_names_properties() {
        let err = Error::ConflictForceNew {
            kind: "interface_bonding".to_string(),
            identity: "bond1".to_string(),
            properties: vec!["name".to_string()],
        };
        assert!(err.to_string().contains("bond1"));
        assert!(err.to_string().contains("name"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_decode_error_is_source() {
        let cause = DecodeError {
            property: "vlan_id".to_string(),
            raw: "ten".to_string(),
            message: "expected integer".to_string(),
        };
        assert_eq!(cause.to_string(), "vlan_id = \"ten\": expected integer");

        let err = Error::from(cause.clone());
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert!(err.to_string().starts_with("cannot decode vlan_id"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), cause.to_string());
    }

    #[test]
    fn test_category_advice_not_empty() {
        assert!(!ErrorCategory::Rejected.advice().is_empty());
        assert!(!ErrorCategory::Transport.description().is_empty());
        assert_eq!(format!("{}", ErrorCategory::NotFound), "Not found on device");
    }
}
