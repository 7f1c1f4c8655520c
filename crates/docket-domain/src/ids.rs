//! Identifiers for workspaces, entities and tenants

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! uuid_v7_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its UUID string form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid {} '{}': {}", $label, s, e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Get the timestamp component of the UUIDv7 (milliseconds since Unix epoch)
            pub fn timestamp(&self) -> u64 {
                // UUIDv7: top 48 bits are Unix millisecond timestamp
                (self.0 >> 80) as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::from_string(&s)
            }
        }
    };
}

uuid_v7_id!(
    /// Unique identifier for a workspace
    ///
    /// UUIDv7 keeps identifiers sortable by creation time, which is the order
    /// matters are listed in.
    WorkspaceId,
    "workspace id"
);

uuid_v7_id!(
    /// Unique identifier for an evidence entity (fact, hypothesis, risk, ...)
    EntityId,
    "entity id"
);

/// Tenant owning a workspace
///
/// The tenant is the ownership boundary: an operation scoped to one tenant
/// never observes or mutates another tenant's workspaces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Create a new tenant identifier
    ///
    /// # Errors
    /// Returns error if the identifier is empty or only whitespace
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err("Tenant id cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// Get tenant id as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> String {
        id.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_id_chronological() {
        let id1 = WorkspaceId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = WorkspaceId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_entity_id_display_and_parse() {
        let id = EntityId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);
        assert_eq!(EntityId::from_string(&id_str).unwrap(), id);
    }

    #[test]
    fn test_invalid_id_string() {
        let err = WorkspaceId::from_string("not-a-uuid").unwrap_err();
        assert!(err.contains("workspace id"));
        assert!(EntityId::from_string("").is_err());
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let id = WorkspaceId::from_value(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let back: WorkspaceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_tenant_id_rejects_blank() {
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new("   ").is_err());
        assert_eq!(TenantId::new("acme-law").unwrap().as_str(), "acme-law");
    }

    #[test]
    fn test_tenant_id_deserialize_validates() {
        let parsed: Result<TenantId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
    }
}
