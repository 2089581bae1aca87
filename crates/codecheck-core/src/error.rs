use thiserror::Error;

use crate::OptionKey;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse rule catalog")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rule id '{id}': expected 'backend_' followed by digits")]
    InvalidRuleId { id: String },

    #[error("duplicate rule id '{id}'")]
    DuplicateRuleId { id: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum OptionError {
    #[error("unknown option '{0}' (expected repeat, consensus or workers)")]
    UnknownOption(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: OptionKey,
        value: String,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_message_names_key_and_value() {
        let err = OptionError::InvalidValue {
            key: OptionKey::Consensus,
            value: "abc".to_string(),
            reason: "expected a number",
        };

        let msg = err.to_string();

        assert!(msg.contains("consensus"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn invalid_rule_id_message_includes_id() {
        let err = CatalogError::InvalidRuleId {
            id: "frontend_1".to_string(),
        };

        assert!(err.to_string().contains("frontend_1"));
    }
}
