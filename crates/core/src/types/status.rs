//! Status enums for cart rows.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`LineStatus`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid line status: {0}")]
pub struct LineStatusError(pub String);

/// Mutation state of a single cart line.
///
/// A line moves `Idle -> QuantityPending -> Idle` while a quantity change is
/// in flight, or `Idle -> RemovalPending` before it leaves the cart. A line
/// is never in both pending states at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// No mutation in flight; all row controls are enabled.
    #[default]
    Idle,
    /// A quantity change is awaiting the backend.
    QuantityPending,
    /// A removal is awaiting the backend.
    RemovalPending,
}

impl LineStatus {
    /// Whether the row accepts a new mutation.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether any mutation is in flight for the row.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::QuantityPending => write!(f, "quantity_pending"),
            Self::RemovalPending => write!(f, "removal_pending"),
        }
    }
}

impl std::str::FromStr for LineStatus {
    type Err = LineStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "quantity_pending" => Ok(Self::QuantityPending),
            "removal_pending" => Ok(Self::RemovalPending),
            _ => Err(LineStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(LineStatus::default(), LineStatus::Idle);
        assert!(LineStatus::default().is_idle());
    }

    #[test]
    fn test_pending_states() {
        assert!(LineStatus::QuantityPending.is_pending());
        assert!(LineStatus::RemovalPending.is_pending());
        assert!(!LineStatus::Idle.is_pending());
    }

    #[test]
    fn test_display_matches_serde() {
        for status in [
            LineStatus::Idle,
            LineStatus::QuantityPending,
            LineStatus::RemovalPending,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.to_string().parse::<LineStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("removed".parse::<LineStatus>().is_err());
    }
}
