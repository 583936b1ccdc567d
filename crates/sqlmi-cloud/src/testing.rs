//! In-memory gateway double for tests

use crate::assignment::IdentityDescriptor;
use crate::builder::ProvisionRequest;
use crate::gateway::{GatewayError, GatewayResult, ResourceGateway};
use crate::identity::ResourceIdentity;
use crate::model::{
    AdminPassword, DesiredState, Edition, Generation, InstanceIdentity, InstanceSettings,
    LicenseType, ManagedInstance, Sku, SkuInfo,
};
use async_trait::async_trait;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Scripted answer to `get`
#[derive(Debug, Clone)]
pub enum GetBehavior {
    NotFound,
    /// Report a ready instance at the probed identity
    Existing,
    Fail(GatewayError),
}

/// Scripted answer to `create`
#[derive(Debug, Clone)]
pub enum CreateBehavior {
    /// Echo the desired state back as the realized instance
    Realize,
    Fail(GatewayError),
}

/// Gateway double with call counters
pub struct FakeGateway {
    get: GetBehavior,
    create: CreateBehavior,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
    last_desired: Mutex<Option<DesiredState>>,
    create_entered: Arc<Notify>,
    create_release: Option<Arc<Notify>>,
    cancel_on_get: Option<CancellationToken>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            get: GetBehavior::NotFound,
            create: CreateBehavior::Realize,
            get_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            last_desired: Mutex::new(None),
            create_entered: Arc::new(Notify::new()),
            create_release: None,
            cancel_on_get: None,
        }
    }

    pub fn with_get(mut self, behavior: GetBehavior) -> Self {
        self.get = behavior;
        self
    }

    pub fn with_create(mut self, behavior: CreateBehavior) -> Self {
        self.create = behavior;
        self
    }

    /// Make `create` wait until `release` is notified
    pub fn with_create_gate(mut self, release: Arc<Notify>) -> Self {
        self.create_release = Some(release);
        self
    }

    /// Cancel `token` while answering `get`
    pub fn with_cancel_on_get(mut self, token: CancellationToken) -> Self {
        self.cancel_on_get = Some(token);
        self
    }

    /// Notified once `create` has been entered
    pub fn create_entered(&self) -> Arc<Notify> {
        Arc::clone(&self.create_entered)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Desired state received by the last `create`
    pub fn last_desired(&self) -> Option<DesiredState> {
        self.last_desired
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ResourceGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get(&self, identity: &ResourceIdentity) -> GatewayResult<ManagedInstance> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_get {
            token.cancel();
        }
        match &self.get {
            GetBehavior::NotFound => Err(GatewayError::not_found(format!(
                "(ResourceNotFound) The Resource 'Microsoft.Sql/managedInstances/{}' under resource group '{}' was not found.",
                identity.name(),
                identity.resource_group()
            ))
            .with_code("ResourceNotFound")),
            GetBehavior::Existing => Ok(existing_instance(identity)),
            GetBehavior::Fail(e) => Err(e.clone()),
        }
    }

    async fn create(
        &self,
        identity: &ResourceIdentity,
        desired: DesiredState,
    ) -> GatewayResult<ManagedInstance> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_entered.notify_one();
        if let Some(release) = &self.create_release {
            release.notified().await;
        }

        if let Ok(mut guard) = self.last_desired.lock() {
            *guard = Some(desired.clone());
        }

        match &self.create {
            CreateBehavior::Realize => Ok(realize(identity, &desired)),
            CreateBehavior::Fail(e) => Err(e.clone()),
        }
    }
}

fn resource_id(identity: &ResourceIdentity) -> String {
    format!(
        "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/{}/providers/Microsoft.Sql/managedInstances/{}",
        identity.resource_group(),
        identity.name()
    )
}

fn existing_instance(identity: &ResourceIdentity) -> ManagedInstance {
    ManagedInstance {
        id: Some(resource_id(identity)),
        name: identity.name().to_string(),
        resource_group: Some(identity.resource_group().to_string()),
        location: Some("westeurope".to_string()),
        sku: None,
        license_type: Some(LicenseType::BasePrice.to_string()),
        storage_size_gb: Some(256),
        v_cores: Some(8),
        subnet_id: None,
        state: Some("Ready".to_string()),
        fully_qualified_domain_name: None,
        administrator_login: Some("existing".to_string()),
        identity: None,
        tags: None,
        extra: Default::default(),
    }
}

fn realize(identity: &ResourceIdentity, desired: &DesiredState) -> ManagedInstance {
    let sku = desired.sku();
    ManagedInstance {
        id: Some(resource_id(identity)),
        name: identity.name().to_string(),
        resource_group: Some(identity.resource_group().to_string()),
        location: Some(desired.location().to_string()),
        sku: Some(SkuInfo {
            name: sku.name(),
            tier: Some(sku.tier().to_string()),
            family: Some(sku.family().to_string()),
            capacity: Some(desired.v_cores().get()),
        }),
        license_type: Some(desired.license_type().to_string()),
        storage_size_gb: Some(desired.storage_size_gb().get()),
        v_cores: Some(desired.v_cores().get()),
        subnet_id: Some(desired.subnet_id().to_string()),
        state: Some("Ready".to_string()),
        fully_qualified_domain_name: Some(format!(
            "{}.0123456789ab.database.windows.net",
            identity.name()
        )),
        administrator_login: Some(desired.administrator_login().to_string()),
        identity: match desired.assigned_identity() {
            IdentityDescriptor::SystemAssigned => Some(InstanceIdentity {
                kind: "SystemAssigned".to_string(),
                principal_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
                tenant_id: Some("22222222-2222-2222-2222-222222222222".to_string()),
            }),
            IdentityDescriptor::Unassigned => None,
        },
        tags: Some(desired.tags().clone()),
        extra: Default::default(),
    }
}

/// A valid request for `rg1/sqlmi1` (GP_Gen5, 4 vCores, 32 GB)
pub fn sample_request() -> ProvisionRequest {
    ProvisionRequest {
        resource_group: "rg1".to_string(),
        name: "sqlmi1".to_string(),
        location: "westeurope".to_string(),
        subnet_id: "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/mi".to_string(),
        license_type: LicenseType::LicenseIncluded,
        storage_size_gb: NonZeroU32::new(32).unwrap_or(NonZeroU32::MIN),
        v_cores: NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN),
        sku: Sku::new(Edition::GeneralPurpose, Generation::Gen5),
        administrator_login: "miadmin".to_string(),
        administrator_password: AdminPassword::new("S3cret!pass"),
        tags: vec![("env".to_string(), "prod".to_string())],
        assign_identity: false,
        settings: InstanceSettings::default(),
    }
}
