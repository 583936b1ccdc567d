//! Resource addressing

use crate::error::{ProvisionError, Result};
use serde::Serialize;
use std::fmt;

/// Address of a managed instance within a subscription
///
/// Both parts are non-empty and trimmed; the value is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentity {
    resource_group: String,
    name: String,
}

impl ResourceIdentity {
    pub fn new(resource_group: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let resource_group = resource_group.into().trim().to_string();
        let name = name.into().trim().to_string();

        if resource_group.is_empty() {
            return Err(ProvisionError::InvalidIdentity(
                "resource group must not be empty".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(ProvisionError::InvalidIdentity(
                "instance name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            resource_group,
            name,
        })
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trims_parts() {
        let id = ResourceIdentity::new(" rg1 ", "sqlmi1\n").unwrap();
        assert_eq!(id.resource_group(), "rg1");
        assert_eq!(id.name(), "sqlmi1");
        assert_eq!(id.to_string(), "rg1/sqlmi1");
    }

    #[test]
    fn test_identity_rejects_empty_parts() {
        assert!(matches!(
            ResourceIdentity::new("", "sqlmi1"),
            Err(ProvisionError::InvalidIdentity(_))
        ));
        assert!(matches!(
            ResourceIdentity::new("rg1", "   "),
            Err(ProvisionError::InvalidIdentity(_))
        ));
    }
}
