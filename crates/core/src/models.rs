//! API resource types exchanged with the cluster API server.
//!
//! Field names follow the server's camelCase wire format; optional fields are
//! left out of the encoded form when unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API group serving identity mappings.
pub const GROUP: &str = "user.openshift.io";
/// API version of the group.
pub const VERSION: &str = "v1";
/// Plural resource name used in request paths.
pub const RESOURCE: &str = "useridentitymappings";
/// Singular resource name used in printed output.
pub const RESOURCE_SINGULAR: &str = "useridentitymapping";

fn default_kind() -> String {
    UserIdentityMapping::KIND.into()
}

fn default_api_version() -> String {
    format!("{}/{}", GROUP, VERSION)
}

// ---------------------------------------------------------------------------
// Shared object plumbing
// ---------------------------------------------------------------------------

/// Reference to another API object, by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
}

impl ObjectReference {
    /// A reference carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Standard object metadata. Everything except `name` is assigned by the
/// server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// UserIdentityMapping
// ---------------------------------------------------------------------------

/// Association binding one external identity to one cluster user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentityMapping {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub identity: ObjectReference,
    pub user: ObjectReference,
}

impl UserIdentityMapping {
    pub const KIND: &'static str = "UserIdentityMapping";

    /// Build a local mapping record. The server names a mapping after its
    /// identity, so the local record does the same.
    pub fn new(identity: impl Into<String>, user: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            kind: default_kind(),
            api_version: default_api_version(),
            metadata: ObjectMeta {
                name: identity.clone(),
                ..Default::default()
            },
            identity: ObjectReference::named(identity),
            user: ObjectReference::named(user),
        }
    }

    /// Object name used when printing.
    pub fn name(&self) -> &str {
        if self.metadata.name.is_empty() {
            &self.identity.name
        } else {
            &self.metadata.name
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Structured failure body returned by the API server on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub code: u16,
}

impl Status {
    pub fn is_status(&self) -> bool {
        self.kind == "Status"
    }
}
