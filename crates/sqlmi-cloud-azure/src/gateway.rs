//! Azure CLI gateway implementation

use crate::az::AzCli;
use async_trait::async_trait;
use sqlmi_cloud::{
    DesiredState, GatewayError, GatewayResult, ManagedInstance, ResourceGateway, ResourceIdentity,
};

/// Managed-instance gateway backed by the `az` CLI
///
/// Authentication is whatever `az login` established. No retries are made
/// here; a failed call is reported once.
#[derive(Debug, Clone, Default)]
pub struct AzSqlMiGateway {
    az: AzCli,
}

impl AzSqlMiGateway {
    pub fn new(az: AzCli) -> Self {
        Self { az }
    }

    /// Use a specific az executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self::new(AzCli::new(program))
    }
}

#[async_trait]
impl ResourceGateway for AzSqlMiGateway {
    fn name(&self) -> &str {
        "az-cli"
    }

    async fn get(&self, identity: &ResourceIdentity) -> GatewayResult<ManagedInstance> {
        self.az
            .show_managed_instance(identity)
            .await
            .map_err(GatewayError::from)
    }

    async fn create(
        &self,
        identity: &ResourceIdentity,
        desired: DesiredState,
    ) -> GatewayResult<ManagedInstance> {
        tracing::info!(
            "Creating managed instance {} ({}, {} vCores, {} GB)",
            identity,
            desired.sku(),
            desired.v_cores(),
            desired.storage_size_gb()
        );

        self.az
            .create_managed_instance(&desired)
            .await
            .map_err(GatewayError::from)
    }
}
