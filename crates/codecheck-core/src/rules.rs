use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CatalogError, Severity};

const RULE_ID_PREFIX: &str = "backend_";
const BUNDLED_CATALOG: &str = include_str!("../rules/backend.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

/// Rules handed to the inspection engine, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalog {
    rules: IndexMap<String, Rule>,
}

impl RuleCatalog {
    /// Catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog is malformed.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml(BUNDLED_CATALOG)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for invalid TOML, or an id error for
    /// malformed or repeated rule ids.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_rules(file.rules)
    }

    /// # Errors
    ///
    /// Returns an error if a rule id is malformed or repeated.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();
        for rule in rules {
            if !is_valid_rule_id(&rule.id) {
                return Err(CatalogError::InvalidRuleId { id: rule.id });
            }
            if map.contains_key(&rule.id) {
                return Err(CatalogError::DuplicateRuleId { id: rule.id });
            }
            map.insert(rule.id.clone(), rule);
        }
        Ok(Self { rules: map })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn is_valid_rule_id(id: &str) -> bool {
    id.strip_prefix(RULE_ID_PREFIX)
        .is_some_and(|digits| digits.len() >= 3 && digits.bytes().all(|b| b.is_ascii_digit()))
}
