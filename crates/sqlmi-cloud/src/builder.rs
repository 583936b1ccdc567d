//! Desired-state construction

use crate::assignment::IdentityDescriptor;
use crate::error::{ProvisionError, Result};
use crate::identity::ResourceIdentity;
use crate::model::{AdminPassword, DesiredState, InstanceSettings, LicenseType, Sku};
use crate::tags::{ArmTagValidator, TagValidator, Tags};
use std::num::NonZeroU32;

/// User input for one provisioning run
///
/// Numeric ranges are already enforced by the types; everything else is
/// checked by [`ProvisionRequest::preflight`].
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub resource_group: String,
    pub name: String,
    pub location: String,
    /// Resource ID of the delegated subnet
    pub subnet_id: String,
    pub license_type: LicenseType,
    pub storage_size_gb: NonZeroU32,
    pub v_cores: NonZeroU32,
    pub sku: Sku,
    pub administrator_login: String,
    pub administrator_password: AdminPassword,
    /// Raw `key=value` pairs in the order given
    pub tags: Vec<(String, String)>,
    pub assign_identity: bool,
    pub settings: InstanceSettings,
}

impl ProvisionRequest {
    pub fn identity(&self) -> Result<ResourceIdentity> {
        ResourceIdentity::new(&self.resource_group, &self.name)
    }

    /// Input checks that must pass before the control plane is contacted
    pub fn preflight<V: TagValidator>(&self, validator: &V) -> Result<ResourceIdentity> {
        let identity = self.identity()?;

        let required = [
            ("location", self.location.as_str()),
            ("subnet", self.subnet_id.as_str()),
            ("administrator login", self.administrator_login.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisionError::InvalidInput(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        if self.administrator_password.is_empty() {
            return Err(ProvisionError::InvalidInput(
                "administrator password must not be empty".to_string(),
            ));
        }

        validator.validate(&self.tags)?;
        Ok(identity)
    }
}

/// Maps a [`ProvisionRequest`] onto a [`DesiredState`]
///
/// Pure: no I/O, same input gives the same output.
#[derive(Debug, Clone, Default)]
pub struct DesiredStateBuilder<V = ArmTagValidator> {
    validator: V,
}

impl DesiredStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: TagValidator> DesiredStateBuilder<V> {
    pub fn with_validator(validator: V) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    pub fn validate_tags(&self, raw: &[(String, String)]) -> Result<Tags> {
        self.validator.validate(raw)
    }

    pub fn build(
        &self,
        identity: ResourceIdentity,
        request: ProvisionRequest,
    ) -> Result<DesiredState> {
        let tags = self.validate_tags(&request.tags)?;

        Ok(DesiredState {
            identity,
            location: request.location.trim().to_string(),
            subnet_id: request.subnet_id.trim().to_string(),
            license_type: request.license_type,
            storage_size_gb: request.storage_size_gb,
            v_cores: request.v_cores,
            sku: request.sku,
            administrator_login: request.administrator_login,
            administrator_password: request.administrator_password,
            tags,
            assigned_identity: IdentityDescriptor::resolve(request.assign_identity),
            settings: request.settings,
        })
    }
}
