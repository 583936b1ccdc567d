//! Mapping of az CLI failures onto gateway statuses

use regex::Regex;
use sqlmi_cloud::{GatewayError, GatewayStatus};
use std::sync::LazyLock;

// "Code: ResourceNotFound" (az >= 2.40)
static CODE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Code:\s*([A-Za-z][A-Za-z0-9_.]*)").unwrap());

// "ERROR: (ResourceNotFound) The Resource ..."
static CODE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Za-z][A-Za-z0-9_.]*)\)").unwrap());

/// Extract the ARM error code from az stderr
pub fn error_code(stderr: &str) -> Option<String> {
    CODE_LINE
        .captures(stderr)
        .or_else(|| CODE_PAREN.captures(stderr))
        .map(|c| c[1].to_string())
}

/// Classify an ARM error code
pub fn status_for_code(code: &str) -> GatewayStatus {
    match code {
        "ResourceNotFound" | "ResourceGroupNotFound" | "ParentResourceNotFound" | "NotFound" => {
            GatewayStatus::NotFound
        }
        "AuthorizationFailed" | "LinkedAuthorizationFailed" | "Forbidden" => {
            GatewayStatus::Forbidden
        }
        "InvalidAuthenticationToken"
        | "ExpiredAuthenticationToken"
        | "AuthenticationFailed"
        | "Unauthorized" => GatewayStatus::Unauthorized,
        "TooManyRequests" => GatewayStatus::Throttled,
        "InternalServerError" | "ServiceUnavailable" | "GatewayTimeout" | "BadGateway" => {
            GatewayStatus::Unavailable
        }
        "Conflict" => GatewayStatus::Conflict,
        c if c.ends_with("AlreadyExists") || c.ends_with("Conflict") => GatewayStatus::Conflict,
        c if c.contains("Throttl") => GatewayStatus::Throttled,
        c if c.starts_with("Invalid") || c == "BadRequest" || c.contains("Quota") => {
            GatewayStatus::Rejected
        }
        _ => GatewayStatus::Unknown,
    }
}

/// Turn the stderr of a failed az invocation into a [`GatewayError`]
///
/// The message is the trimmed stderr, untouched otherwise.
pub fn classify_stderr(stderr: &str) -> GatewayError {
    let message = stderr.trim();
    let code = error_code(message);

    let status = match code.as_deref() {
        Some(code) => status_for_code(code),
        None => status_without_code(message),
    };

    let error = GatewayError::new(status, message);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}

/// Older az releases and local failures print no code
///
/// Never yields `NotFound`: without an ARM code the text may concern the
/// subscription or the CLI itself rather than the instance.
fn status_without_code(message: &str) -> GatewayStatus {
    let lower = message.to_lowercase();
    if lower.contains("az login") || lower.contains("aadsts") {
        GatewayStatus::Unauthorized
    } else if lower.contains("connection") || lower.contains("timed out") {
        GatewayStatus::Transport
    } else {
        GatewayStatus::Unknown
    }
}
