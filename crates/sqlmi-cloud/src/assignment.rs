//! Managed identity assignment

use serde::Serialize;
use std::fmt;

/// Identity to attach to the instance on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum IdentityDescriptor {
    SystemAssigned,
    #[default]
    #[serde(rename = "None")]
    Unassigned,
}

impl IdentityDescriptor {
    /// Resolve the `--assign-identity` switch into a descriptor
    pub fn resolve(assign: bool) -> Self {
        if assign {
            IdentityDescriptor::SystemAssigned
        } else {
            IdentityDescriptor::Unassigned
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, IdentityDescriptor::SystemAssigned)
    }
}

impl fmt::Display for IdentityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityDescriptor::SystemAssigned => write!(f, "SystemAssigned"),
            IdentityDescriptor::Unassigned => write!(f, "None"),
        }
    }
}
