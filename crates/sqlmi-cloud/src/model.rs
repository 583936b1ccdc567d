//! Desired and realized managed-instance models

use crate::assignment::IdentityDescriptor;
use crate::error::{ProvisionError, Result};
use crate::identity::ResourceIdentity;
use crate::tags::Tags;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

const REDACTED: &str = "********";

/// Service tier of a managed instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edition {
    GeneralPurpose,
    BusinessCritical,
}

impl Edition {
    /// Short prefix used in SKU names ("GP", "BC")
    pub fn short(&self) -> &'static str {
        match self {
            Edition::GeneralPurpose => "GP",
            Edition::BusinessCritical => "BC",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edition::GeneralPurpose => write!(f, "GeneralPurpose"),
            Edition::BusinessCritical => write!(f, "BusinessCritical"),
        }
    }
}

/// Hardware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    Gen4,
    Gen5,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Gen4 => write!(f, "Gen4"),
            Generation::Gen5 => write!(f, "Gen5"),
        }
    }
}

/// Normalized SKU selection (edition × generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku {
    pub edition: Edition,
    pub generation: Generation,
}

impl Sku {
    pub fn new(edition: Edition, generation: Generation) -> Self {
        Self {
            edition,
            generation,
        }
    }

    /// SKU name as understood by the control plane (e.g., "GP_Gen5")
    pub fn name(&self) -> String {
        format!("{}_{}", self.edition.short(), self.generation)
    }

    pub fn tier(&self) -> Edition {
        self.edition
    }

    pub fn family(&self) -> Generation {
        self.generation
    }
}

impl Default for Sku {
    fn default() -> Self {
        Self::new(Edition::GeneralPurpose, Generation::Gen5)
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.edition, self.generation)
    }
}

/// Accepts "GeneralPurpose-Gen5", "GP_Gen5", "business-critical_gen4" and
/// similar spellings, case-insensitively.
impl FromStr for Sku {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ProvisionError::InvalidInput(format!(
                "unknown SKU '{}' (expected GeneralPurpose-Gen5, BusinessCritical-Gen4, GP_Gen5, ...)",
                s
            ))
        };

        let normalized = s.trim().to_ascii_lowercase();
        let (edition, generation) = normalized
            .rsplit_once(['-', '_'])
            .ok_or_else(invalid)?;

        let edition = match edition.replace(['-', '_', ' '], "").as_str() {
            "gp" | "generalpurpose" => Edition::GeneralPurpose,
            "bc" | "businesscritical" => Edition::BusinessCritical,
            _ => return Err(invalid()),
        };
        let generation = match generation {
            "gen4" => Generation::Gen4,
            "gen5" => Generation::Gen5,
            _ => return Err(invalid()),
        };

        Ok(Self::new(edition, generation))
    }
}

/// SQL Server license model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LicenseType {
    /// Bring your own license (Azure Hybrid Benefit)
    BasePrice,
    #[default]
    LicenseIncluded,
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseType::BasePrice => write!(f, "BasePrice"),
            LicenseType::LicenseIncluded => write!(f, "LicenseIncluded"),
        }
    }
}

impl FromStr for LicenseType {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseprice" => Ok(LicenseType::BasePrice),
            "licenseincluded" => Ok(LicenseType::LicenseIncluded),
            _ => Err(ProvisionError::InvalidInput(format!(
                "unknown license type '{}' (expected BasePrice or LicenseIncluded)",
                s
            ))),
        }
    }
}

/// Connection type for the instance endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyOverride {
    Default,
    Proxy,
    Redirect,
}

impl fmt::Display for ProxyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyOverride::Default => write!(f, "Default"),
            ProxyOverride::Proxy => write!(f, "Proxy"),
            ProxyOverride::Redirect => write!(f, "Redirect"),
        }
    }
}

impl FromStr for ProxyOverride {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ProxyOverride::Default),
            "proxy" => Ok(ProxyOverride::Proxy),
            "redirect" => Ok(ProxyOverride::Redirect),
            _ => Err(ProvisionError::InvalidInput(format!(
                "unknown proxy override '{}' (expected Default, Proxy or Redirect)",
                s
            ))),
        }
    }
}

/// Administrator password
///
/// Debug output and serialization always produce a mask; the clear text is
/// only reachable through [`AdminPassword::expose`].
pub struct AdminPassword(SecretString);

impl AdminPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::new(password.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl Clone for AdminPassword {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdminPassword({})", REDACTED)
    }
}

impl Serialize for AdminPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Optional instance settings; `None` leaves the service default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_override: Option<ProxyOverride>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_data_endpoint_enabled: Option<bool>,

    /// Resource ID of the instance whose DNS zone is shared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_zone_partner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_pool: Option<String>,
}

/// The instance the caller asked for
///
/// Only [`crate::DesiredStateBuilder`] constructs this; it is read-only
/// afterwards and handed to the gateway by value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    pub(crate) identity: ResourceIdentity,
    pub(crate) location: String,
    pub(crate) subnet_id: String,
    pub(crate) license_type: LicenseType,
    pub(crate) storage_size_gb: NonZeroU32,
    pub(crate) v_cores: NonZeroU32,
    pub(crate) sku: Sku,
    pub(crate) administrator_login: String,
    pub(crate) administrator_password: AdminPassword,
    pub(crate) tags: Tags,
    pub(crate) assigned_identity: IdentityDescriptor,
    pub(crate) settings: InstanceSettings,
}

impl DesiredState {
    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn subnet_id(&self) -> &str {
        &self.subnet_id
    }

    pub fn license_type(&self) -> LicenseType {
        self.license_type
    }

    pub fn storage_size_gb(&self) -> NonZeroU32 {
        self.storage_size_gb
    }

    pub fn v_cores(&self) -> NonZeroU32 {
        self.v_cores
    }

    pub fn sku(&self) -> Sku {
        self.sku
    }

    pub fn administrator_login(&self) -> &str {
        &self.administrator_login
    }

    pub fn administrator_password(&self) -> &AdminPassword {
        &self.administrator_password
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn assigned_identity(&self) -> IdentityDescriptor {
        self.assigned_identity
    }

    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }
}

/// SKU as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuInfo {
    pub name: String,

    #[serde(default)]
    pub tier: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub capacity: Option<u32>,
}

/// Managed identity as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIdentity {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub principal_id: Option<String>,

    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Realized managed instance, as returned by the control plane
///
/// Attributes this crate does not model are kept in `extra` verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedInstance {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub resource_group: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub sku: Option<SkuInfo>,

    #[serde(default)]
    pub license_type: Option<String>,

    #[serde(default, rename = "storageSizeInGb")]
    pub storage_size_gb: Option<u32>,

    #[serde(default)]
    pub v_cores: Option<u32>,

    #[serde(default)]
    pub subnet_id: Option<String>,

    /// Provisioning state (e.g., "Creating", "Ready")
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub fully_qualified_domain_name: Option<String>,

    #[serde(default)]
    pub administrator_login: Option<String>,

    #[serde(default)]
    pub identity: Option<InstanceIdentity>,

    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ManagedInstance {
    /// Whether the realized instance sits at `identity`
    ///
    /// Instance names are case-insensitive on the service side.
    pub fn matches(&self, identity: &ResourceIdentity) -> bool {
        let group_matches = self
            .resource_group
            .as_deref()
            .is_none_or(|rg| rg.eq_ignore_ascii_case(identity.resource_group()));
        group_matches && self.name.eq_ignore_ascii_case(identity.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_parsing() {
        let cases = [
            ("GeneralPurpose-Gen5", Edition::GeneralPurpose, Generation::Gen5),
            ("GP_Gen4", Edition::GeneralPurpose, Generation::Gen4),
            ("bc_gen5", Edition::BusinessCritical, Generation::Gen5),
            ("Business-Critical-Gen4", Edition::BusinessCritical, Generation::Gen4),
        ];
        for (input, edition, generation) in cases {
            let sku: Sku = input.parse().unwrap();
            assert_eq!(sku, Sku::new(edition, generation), "input: {}", input);
        }

        assert!("Premium-Gen5".parse::<Sku>().is_err());
        assert!("GeneralPurpose".parse::<Sku>().is_err());
        assert!("GP_Gen6".parse::<Sku>().is_err());
    }

    #[test]
    fn test_sku_names() {
        let sku = Sku::new(Edition::BusinessCritical, Generation::Gen5);
        assert_eq!(sku.name(), "BC_Gen5");
        assert_eq!(sku.tier().to_string(), "BusinessCritical");
        assert_eq!(sku.family().to_string(), "Gen5");
        assert_eq!(sku.to_string(), "BusinessCritical-Gen5");
    }

    #[test]
    fn test_license_type_parsing() {
        assert_eq!(
            "licenseincluded".parse::<LicenseType>().unwrap(),
            LicenseType::LicenseIncluded
        );
        assert_eq!(
            "BasePrice".parse::<LicenseType>().unwrap(),
            LicenseType::BasePrice
        );
        assert!("Free".parse::<LicenseType>().is_err());
    }

    #[test]
    fn test_password_is_masked() {
        let password = AdminPassword::new("P@ssw0rd!");
        assert_eq!(format!("{:?}", password), "AdminPassword(********)");
        assert_eq!(
            serde_json::to_string(&password).unwrap(),
            format!("\"{}\"", REDACTED)
        );
        assert_eq!(password.clone().expose(), "P@ssw0rd!");
    }

    #[test]
    fn test_managed_instance_from_service_json() {
        let json = serde_json::json!({
            "id": "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Sql/managedInstances/sqlmi1",
            "name": "sqlmi1",
            "resourceGroup": "rg1",
            "location": "westeurope",
            "sku": { "name": "GP_Gen5", "tier": "GeneralPurpose", "family": "Gen5", "capacity": 4 },
            "licenseType": "LicenseIncluded",
            "storageSizeInGb": 32,
            "vCores": 4,
            "state": "Ready",
            "tags": null,
            "minimalTlsVersion": "1.2"
        });

        let instance: ManagedInstance = serde_json::from_value(json).unwrap();
        assert_eq!(instance.name, "sqlmi1");
        assert_eq!(instance.storage_size_gb, Some(32));
        assert_eq!(instance.v_cores, Some(4));
        assert_eq!(instance.sku.as_ref().unwrap().name, "GP_Gen5");
        assert!(instance.tags.is_none());
        assert_eq!(
            instance.extra.get("minimalTlsVersion"),
            Some(&serde_json::json!("1.2"))
        );

        let identity = ResourceIdentity::new("RG1", "SQLMI1").unwrap();
        assert!(instance.matches(&identity));
    }
}
