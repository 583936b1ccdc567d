//! Resource tag validation

use crate::error::{ProvisionError, Result};
use std::collections::{BTreeMap, HashSet};

/// Validated tags, ordered by key
pub type Tags = BTreeMap<String, String>;

pub const MAX_TAGS: usize = 50;
pub const MAX_KEY_LEN: usize = 512;
pub const MAX_VALUE_LEN: usize = 256;
const FORBIDDEN_KEY_CHARS: &[char] = &['<', '>', '%', '&', '\\', '?', '/'];

/// Tag validation collaborator
///
/// Receives tags in the order the user gave them, so that colliding keys
/// are still visible to the validator.
pub trait TagValidator: Send + Sync {
    fn validate(&self, raw: &[(String, String)]) -> Result<Tags>;
}

/// Azure Resource Manager tag rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmTagValidator;

impl TagValidator for ArmTagValidator {
    fn validate(&self, raw: &[(String, String)]) -> Result<Tags> {
        if raw.len() > MAX_TAGS {
            return Err(ProvisionError::InvalidTag(format!(
                "at most {} tags are allowed, got {}",
                MAX_TAGS,
                raw.len()
            )));
        }

        let mut seen = HashSet::with_capacity(raw.len());
        let mut tags = Tags::new();

        for (key, value) in raw {
            if key.trim().is_empty() {
                return Err(ProvisionError::InvalidTag(
                    "tag key must not be empty".to_string(),
                ));
            }
            if key.chars().count() > MAX_KEY_LEN {
                return Err(ProvisionError::InvalidTag(format!(
                    "tag key '{}...' exceeds {} characters",
                    key.chars().take(16).collect::<String>(),
                    MAX_KEY_LEN
                )));
            }
            if let Some(c) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
                return Err(ProvisionError::InvalidTag(format!(
                    "tag key '{}' contains forbidden character '{}'",
                    key, c
                )));
            }
            if value.chars().count() > MAX_VALUE_LEN {
                return Err(ProvisionError::InvalidTag(format!(
                    "value of tag '{}' exceeds {} characters",
                    key, MAX_VALUE_LEN
                )));
            }
            // Tag keys are case-insensitive on the service side
            if !seen.insert(key.to_lowercase()) {
                return Err(ProvisionError::InvalidTag(format!(
                    "duplicate tag key '{}' (keys are case-insensitive)",
                    key
                )));
            }

            tags.insert(key.clone(), value.clone());
        }

        Ok(tags)
    }
}
