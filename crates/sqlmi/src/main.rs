mod commands;
mod output;
mod progress;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlmi")]
#[command(about = "Azure SQL Managed Instance を、一度だけ作る。", long_about = None)]
struct Cli {
    /// 詳細ログを出力 (RUST_LOG が優先)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// マネージドインスタンスを作成（既に存在する場合はエラー）
    Create(Box<commands::create::CreateArgs>),
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は結果出力専用）
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("sqlmi {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Create(args) => {
            // 設定ファイル（任意）から既定値を読み込む
            let (defaults, source) = sqlmi_config::load_defaults()?;
            if let Some(path) = &source {
                eprintln!(
                    "{} {}",
                    "設定ファイル:".dimmed(),
                    path.display().to_string().cyan()
                );
            }

            commands::create::handle(*args, &defaults).await
        }
    }
}
