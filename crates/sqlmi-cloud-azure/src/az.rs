//! az CLI wrapper
//!
//! Wraps the `az sql mi` commands used for provisioning.

use crate::error::{AzureError, Result};
use sqlmi_cloud::{DesiredState, ManagedInstance, ResourceIdentity};
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

const MASK: &str = "********";

/// Argument list whose secret entries are masked when displayed
#[derive(Default)]
pub struct AzArgs {
    args: Vec<String>,
    secret: Vec<usize>,
}

impl AzArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn opt(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.arg(flag).arg(value)
    }

    /// Flag followed by a value that must never be printed
    pub fn secret_opt(&mut self, flag: &str, value: &str) -> &mut Self {
        self.arg(flag);
        self.secret.push(self.args.len());
        self.arg(value)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for AzArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if self.secret.contains(&i) {
                f.write_str(MASK)?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

/// az CLI wrapper
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new("az")
    }
}

impl AzCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run an az command and return stdout
    pub async fn run_command(&self, args: &AzArgs) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args.as_slice());
        cmd.arg("--output").arg("json");
        cmd.arg("--only-show-errors");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.program, args);

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AzureError::AzNotFound(self.program.clone()),
            _ => AzureError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `az sql mi show`
    pub async fn show_managed_instance(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<ManagedInstance> {
        let output = self.run_command(&show_args(identity)).await?;
        parse_instance(&output)
    }

    /// `az sql mi create`
    pub async fn create_managed_instance(&self, desired: &DesiredState) -> Result<ManagedInstance> {
        let output = self.run_command(&create_args(desired)).await?;
        parse_instance(&output)
    }
}

pub fn show_args(identity: &ResourceIdentity) -> AzArgs {
    let mut args = AzArgs::new();
    args.arg("sql")
        .arg("mi")
        .arg("show")
        .opt("--resource-group", identity.resource_group())
        .opt("--name", identity.name());
    args
}

pub fn create_args(desired: &DesiredState) -> AzArgs {
    let identity = desired.identity();
    let sku = desired.sku();

    let mut args = AzArgs::new();
    args.arg("sql")
        .arg("mi")
        .arg("create")
        .opt("--resource-group", identity.resource_group())
        .opt("--name", identity.name())
        .opt("--location", desired.location())
        .opt("--subnet", desired.subnet_id())
        .opt("--license-type", desired.license_type().to_string())
        .opt("--storage", format!("{}GB", desired.storage_size_gb()))
        .opt("--capacity", desired.v_cores().to_string())
        .opt("--edition", sku.tier().to_string())
        .opt("--family", sku.family().to_string())
        .opt("--admin-user", desired.administrator_login())
        .secret_opt("--admin-password", desired.administrator_password().expose());

    if !desired.tags().is_empty() {
        args.arg("--tags");
        for (key, value) in desired.tags() {
            args.arg(format!("{}={}", key, value));
        }
    }

    if desired.assigned_identity().is_assigned() {
        args.arg("--assign-identity");
    }

    let settings = desired.settings();
    if let Some(collation) = &settings.collation {
        args.opt("--collation", collation);
    }
    if let Some(timezone) = &settings.timezone_id {
        args.opt("--timezone-id", timezone);
    }
    if let Some(proxy) = settings.proxy_override {
        args.opt("--proxy-override", proxy.to_string());
    }
    if let Some(enabled) = settings.public_data_endpoint_enabled {
        args.opt("--public-data-endpoint-enabled", enabled.to_string());
    }
    if let Some(partner) = &settings.dns_zone_partner {
        args.opt("--dns-zone-partner", partner);
    }
    if let Some(pool) = &settings.instance_pool {
        args.opt("--instance-pool-name", pool);
    }

    args
}

fn parse_instance(output: &str) -> Result<ManagedInstance> {
    if output.trim().is_empty() {
        return Err(AzureError::UnexpectedOutput("empty response".to_string()));
    }
    Ok(serde_json::from_str(output)?)
}
