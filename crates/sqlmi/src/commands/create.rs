use crate::output::{self, OutputFormat};
use crate::progress::JobProgress;
use anyhow::{Context, anyhow};
use clap::Args;
use colored::Colorize;
use sqlmi_cloud::{
    AdminPassword, CancellationToken, InstanceSettings, LicenseType, Orchestrator, ProvisionError,
    ProvisionReport, ProvisionRequest, ProxyOverride, Sku, spawn_detached,
};
use sqlmi_cloud_azure::AzSqlMiGateway;
use sqlmi_config::ProvisionDefaults;
use std::num::NonZeroU32;
use std::sync::Arc;

const DEFAULT_STORAGE_SIZE_GB: u32 = 32;
const DEFAULT_VCORES: u32 = 4;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// リソースグループ名
    #[arg(short = 'g', long, env = "SQLMI_RESOURCE_GROUP")]
    pub resource_group: String,

    /// インスタンス名
    #[arg(short = 'n', long)]
    pub name: String,

    /// リージョン (例: japaneast)
    #[arg(short = 'l', long)]
    pub location: Option<String>,

    /// 委任済みサブネットのリソース ID
    #[arg(long)]
    pub subnet_id: Option<String>,

    /// ライセンス種別 (BasePrice, LicenseIncluded)
    #[arg(long)]
    pub license_type: Option<LicenseType>,

    /// ストレージサイズ (GB)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub storage_size_gb: Option<u32>,

    /// vCore 数
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub vcores: Option<u32>,

    /// SKU (例: GeneralPurpose-Gen5, BC_Gen5)
    #[arg(long)]
    pub sku: Option<Sku>,

    /// 管理者ログイン名
    #[arg(short = 'u', long)]
    pub admin_user: Option<String>,

    /// 管理者パスワード
    #[arg(
        short = 'p',
        long,
        env = "SQLMI_ADMIN_PASSWORD",
        hide_env_values = true,
        value_parser = parse_password
    )]
    pub admin_password: Option<AdminPassword>,

    /// タグ (KEY=VALUE、複数指定可)
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// システム割り当てマネージド ID を付与
    #[arg(long)]
    pub assign_identity: bool,

    /// 照合順序 (例: Japanese_CI_AS)
    #[arg(long)]
    pub collation: Option<String>,

    /// タイムゾーン ID (例: Tokyo Standard Time)
    #[arg(long)]
    pub timezone_id: Option<String>,

    /// 接続の種類 (Default, Proxy, Redirect)
    #[arg(long)]
    pub proxy_override: Option<ProxyOverride>,

    /// パブリックデータエンドポイントを有効化
    #[arg(long)]
    pub public_data_endpoint: bool,

    /// DNS ゾーンを共有するインスタンスのリソース ID
    #[arg(long)]
    pub dns_zone_partner: Option<String>,

    /// インスタンスプール名
    #[arg(long)]
    pub instance_pool: Option<String>,

    /// バックグラウンドジョブとして実行
    #[arg(long)]
    pub as_job: bool,

    /// 存在確認と desired state の表示のみ（作成しない）
    #[arg(long)]
    pub dry_run: bool,

    /// 出力形式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// az 実行ファイルのパス
    #[arg(long, env = "SQLMI_AZ_PATH")]
    pub az_path: Option<String>,
}

/// `KEY=VALUE` 形式のタグを分解
fn parse_tag(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("タグは KEY=VALUE 形式で指定してください: '{}'", raw))
}

/// 値は引数解析の直後から伏せ字で扱う
fn parse_password(raw: &str) -> Result<AdminPassword, String> {
    Ok(AdminPassword::new(raw))
}

fn positive(value: u32, flag: &str) -> anyhow::Result<NonZeroU32> {
    NonZeroU32::new(value).ok_or_else(|| anyhow!("{} は 1 以上で指定してください", flag))
}

impl CreateArgs {
    /// CLI 引数 > 設定ファイル > 組み込み既定値 の順で値を決定
    pub fn into_request(self, defaults: &ProvisionDefaults) -> anyhow::Result<ProvisionRequest> {
        let location = self
            .location
            .or_else(|| defaults.location.clone())
            .ok_or_else(|| anyhow!("--location が指定されていません"))?;

        let subnet_id = self
            .subnet_id
            .or_else(|| defaults.subnet_id.clone())
            .ok_or_else(|| anyhow!("--subnet-id が指定されていません"))?;

        let administrator_login = self
            .admin_user
            .or_else(|| defaults.admin_user.clone())
            .ok_or_else(|| anyhow!("--admin-user が指定されていません"))?;

        let administrator_password = self.admin_password.ok_or_else(|| {
            anyhow!("--admin-password または SQLMI_ADMIN_PASSWORD が指定されていません")
        })?;

        let license_type = match (self.license_type, &defaults.license_type) {
            (Some(license), _) => license,
            (None, Some(raw)) => raw
                .parse::<LicenseType>()
                .context("設定ファイルの license_type が不正です")?,
            (None, None) => LicenseType::default(),
        };

        let sku = match (self.sku, &defaults.sku) {
            (Some(sku), _) => sku,
            (None, Some(raw)) => raw
                .parse::<Sku>()
                .context("設定ファイルの sku が不正です")?,
            (None, None) => Sku::default(),
        };

        let storage_size_gb = positive(
            self.storage_size_gb
                .or(defaults.storage_size_gb)
                .unwrap_or(DEFAULT_STORAGE_SIZE_GB),
            "storage_size_gb",
        )?;
        let v_cores = positive(
            self.vcores.or(defaults.vcores).unwrap_or(DEFAULT_VCORES),
            "vcores",
        )?;

        // 設定ファイルのタグは、同じキー（大文字小文字無視）の CLI タグで上書き
        let mut tags: Vec<(String, String)> = defaults
            .tags
            .iter()
            .filter(|(key, _)| {
                !self
                    .tags
                    .iter()
                    .any(|(cli_key, _)| cli_key.eq_ignore_ascii_case(key))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        tags.extend(self.tags);

        Ok(ProvisionRequest {
            resource_group: self.resource_group,
            name: self.name,
            location,
            subnet_id,
            license_type,
            storage_size_gb,
            v_cores,
            sku,
            administrator_login,
            administrator_password,
            tags,
            assign_identity: self.assign_identity,
            settings: InstanceSettings {
                collation: self.collation,
                timezone_id: self.timezone_id,
                proxy_override: self.proxy_override,
                public_data_endpoint_enabled: self.public_data_endpoint.then_some(true),
                dns_zone_partner: self.dns_zone_partner,
                instance_pool: self.instance_pool,
            },
        })
    }
}

pub async fn handle(args: CreateArgs, defaults: &ProvisionDefaults) -> anyhow::Result<()> {
    let format = args.output;
    let dry_run = args.dry_run;
    let as_job = args.as_job;
    let az_path = args
        .az_path
        .clone()
        .or_else(|| defaults.az_path.clone())
        .unwrap_or_else(|| "az".to_string());

    let request = args.into_request(defaults)?;
    let target = format!("{}/{}", request.resource_group, request.name);

    let gateway = Arc::new(AzSqlMiGateway::with_program(az_path));
    let orchestrator = Orchestrator::new(gateway);

    if dry_run {
        eprintln!("{}", format!("{} の作成内容を確認中...", target).yellow());
        let desired = orchestrator.plan(request).await.map_err(report_error)?;
        output::print_plan(&desired, format)?;
        eprintln!();
        eprintln!("{}", "ℹ --dry-run のため作成は行いません".dimmed());
        return Ok(());
    }

    let report = if as_job {
        run_as_job(orchestrator, request, &target).await?
    } else {
        eprintln!("{}", format!("{} を作成中...", target).yellow());
        orchestrator
            .execute(request, &CancellationToken::new())
            .await
    };

    tracing::debug!(
        "Run finished in {} after {}ms (trail: {:?})",
        report.phase(),
        report.duration_ms,
        report.trail
    );

    let instance = report.into_result().map_err(report_error)?;
    eprintln!(
        "{}",
        format!("✓ {} を作成しました", instance.name).green().bold()
    );
    output::print_instance(&instance, format)
}

/// バックグラウンドタスクで実行し、Ctrl-C でフェーズ境界での中断を要求
async fn run_as_job(
    orchestrator: Orchestrator<AzSqlMiGateway>,
    request: ProvisionRequest,
    target: &str,
) -> anyhow::Result<ProvisionReport> {
    let job = spawn_detached(orchestrator, request);
    let progress = JobProgress::new(target);

    let token = job.cancellation_token();
    let notifier = progress.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            notifier.set_message("中断を要求しました。送信済みの作成要求は完了まで待機します...");
            token.cancel();
        }
    });

    let joined = job.join().await;
    interrupt.abort();

    let report = joined.context("作成ジョブが異常終了しました")?;
    match &report.outcome {
        Ok(_) => progress.finish_success(),
        Err(e) => progress.finish_error(&e.to_string()),
    }
    Ok(report)
}

/// 失敗理由に応じたヒントを表示してからエラーを返す
fn report_error(error: ProvisionError) -> anyhow::Error {
    match &error {
        ProvisionError::ResourceAlreadyExists(identity) => {
            eprintln!(
                "{}",
                format!("ℹ {} は作成済みです。既存のインスタンスは変更しません", identity)
                    .yellow()
            );
        }
        ProvisionError::Cancelled { phase } => {
            eprintln!(
                "{}",
                format!("ℹ {} の前で中断しました。リソースは作成されていません", phase).yellow()
            );
        }
        ProvisionError::InvalidTag(_) | ProvisionError::InvalidInput(_) => {
            eprintln!("{}", "ℹ 入力を修正して再実行してください".dimmed());
        }
        _ => {}
    }
    anyhow::Error::new(error)
}
