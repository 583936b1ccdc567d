pub mod error;

pub use error::*;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SQLMI_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["sqlmi.yaml", ".sqlmi.yaml"];

/// `sqlmi create` の既定値
///
/// すべて省略可能。CLI 引数が常に優先される。
/// 管理者パスワードは設定ファイルに書けない（未知のキーとしてエラーになる）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionDefaults {
    pub location: Option<String>,
    pub subnet_id: Option<String>,
    pub license_type: Option<String>,
    pub sku: Option<String>,
    pub storage_size_gb: Option<u32>,
    pub vcores: Option<u32>,
    pub admin_user: Option<String>,
    /// az 実行ファイルのパス
    pub az_path: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// sqlmi のグローバル設定ディレクトリ (~/.config/sqlmi)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlmi"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SQLMI_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: sqlmi.yaml, .sqlmi.yaml
/// 3. ./.sqlmi/config.yaml
/// 4. ~/.config/sqlmi/config.yaml (グローバル設定)
///
/// どこにもなければ `Ok(None)`。
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ExplicitPathNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    // 3. ./.sqlmi/ ディレクトリで検索
    let local = current_dir.join(".sqlmi").join("config.yaml");
    if local.is_file() {
        return Ok(Some(local));
    }

    // 4. グローバル設定ファイル
    if let Some(dir) = config_dir() {
        let global = dir.join("config.yaml");
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// 指定パスの設定ファイルを読み込む
pub fn load_from(path: &Path) -> Result<ProvisionDefaults> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // 空ファイルは既定値として扱う
    if content.trim().is_empty() {
        return Ok(ProvisionDefaults::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定ファイルを探して読み込む。見つからなければ既定値
pub fn load_defaults() -> Result<(ProvisionDefaults, Option<PathBuf>)> {
    match find_config_file()? {
        Some(path) => {
            tracing::debug!("Loading defaults from {}", path.display());
            let defaults = load_from(&path)?;
            Ok((defaults, Some(path)))
        }
        None => {
            tracing::debug!("No config file found, using built-in defaults");
            Ok((ProvisionDefaults::default(), None))
        }
    }
}
