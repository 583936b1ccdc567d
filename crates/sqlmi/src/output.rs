use clap::ValueEnum;
use colored::Colorize;
use sqlmi_cloud::{DesiredState, ManagedInstance};

/// Result rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{}:", label).bold(), value);
}

fn opt(value: &Option<impl std::fmt::Display>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".dimmed().to_string())
}

/// Print the instance returned by the control plane
pub fn print_instance(instance: &ManagedInstance, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(instance)?);
        }
        OutputFormat::Table => {
            println!();
            println!("{}", format!("■ {}", instance.name).green().bold());
            row("Resource group", opt(&instance.resource_group));
            row("Location", opt(&instance.location));
            row("State", opt(&instance.state));
            row(
                "SKU",
                opt(&instance.sku.as_ref().map(|sku| sku.name.clone())),
            );
            row("vCores", opt(&instance.v_cores));
            row("Storage (GB)", opt(&instance.storage_size_gb));
            row("License", opt(&instance.license_type));
            row("FQDN", opt(&instance.fully_qualified_domain_name));
            row(
                "Identity",
                opt(&instance.identity.as_ref().map(|id| id.kind.clone())),
            );
            if let Some(id) = &instance.id {
                row("Resource ID", id.dimmed());
            }
        }
    }
    Ok(())
}

/// Print the state a create would submit (password masked)
pub fn print_plan(desired: &DesiredState, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(desired)?);
        }
        OutputFormat::Table => {
            let identity = desired.identity();
            let sku = desired.sku();
            println!();
            println!(
                "{}",
                format!("+ {} (作成予定)", identity.name()).green().bold()
            );
            row("Resource group", identity.resource_group());
            row("Location", desired.location());
            row("Subnet", desired.subnet_id());
            row("SKU", format!("{} ({})", sku.name(), sku));
            row("vCores", desired.v_cores());
            row("Storage (GB)", desired.storage_size_gb());
            row("License", desired.license_type());
            row("Admin user", desired.administrator_login());
            row("Identity", desired.assigned_identity());
            if !desired.tags().is_empty() {
                let tags: Vec<String> = desired
                    .tags()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                row("Tags", tags.join(", "));
            }
            let settings = desired.settings();
            if let Some(collation) = &settings.collation {
                row("Collation", collation);
            }
            if let Some(timezone) = &settings.timezone_id {
                row("Time zone", timezone);
            }
            if let Some(proxy) = settings.proxy_override {
                row("Proxy override", proxy);
            }
            if let Some(enabled) = settings.public_data_endpoint_enabled {
                row("Public endpoint", enabled);
            }
            if let Some(pool) = &settings.instance_pool {
                row("Instance pool", pool);
            }
        }
    }
    Ok(())
}
