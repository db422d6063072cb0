//! Resolved actors and the role hierarchy.
//!
//! The engine never authenticates anyone; it receives an already-resolved
//! actor (id, display name, role) from the calling layer.

use serde::{Deserialize, Serialize};

use super::id::ActorId;

/// User role in the back-office hierarchy.
///
/// Roles are ordered from lowest to highest privilege.
/// Higher roles can perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can only view vouchers.
    Viewer = 0,
    /// Can create, submit, and liquidate own vouchers.
    Requestor = 1,
    /// Accounting staff: can approve and reconcile.
    Accounting = 2,
    /// Executive: can approve any category.
    Executive = 3,
    /// Full administrative access, including cancelling others' vouchers.
    Admin = 4,
}

impl UserRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "requestor" => Some(Self::Requestor),
            "accounting" => Some(Self::Accounting),
            "executive" => Some(Self::Executive),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Requestor => "requestor",
            Self::Accounting => "accounting",
            Self::Executive => "executive",
            Self::Admin => "admin",
        }
    }

    /// Returns true if the role carries administrative privileges.
    #[must_use]
    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved actor performing an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The actor's unique id.
    pub id: ActorId,
    /// Display name, recorded in audit entries.
    pub name: String,
    /// The actor's role.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub fn new(id: ActorId, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}
