//! Azure CLI error types

use sqlmi_cloud::{GatewayError, GatewayStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found ({0}). Please install the Azure CLI: https://aka.ms/installazurecli")]
    AzNotFound(String),

    /// Non-zero exit; carries the raw stderr
    #[error("{0}")]
    CommandFailed(String),

    #[error("Unexpected az output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for GatewayError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::CommandFailed(stderr) => crate::classify::classify_stderr(&stderr),
            AzureError::AzNotFound(_) | AzureError::IoError(_) => {
                GatewayError::new(GatewayStatus::Transport, err.to_string())
            }
            AzureError::JsonError(_) | AzureError::UnexpectedOutput(_) => {
                GatewayError::new(GatewayStatus::Malformed, err.to_string())
            }
        }
    }
}
