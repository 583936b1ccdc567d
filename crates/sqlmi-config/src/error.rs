use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルの読み込みに失敗しました: {path}\n理由: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("設定ファイルの形式が不正です: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(
        "SQLMI_CONFIG_PATH で指定された設定ファイルが見つかりません: {0}"
    )]
    ExplicitPathNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
