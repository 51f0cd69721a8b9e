use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// a policy document as written by the administrator (JSON5)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// status manager name -> allowed status values; the index of a manager
    /// is its position in name order
    #[serde(default)]
    pub status_managers: BTreeMap<String, Vec<String>>,

    /// fileclass name -> boolean expression
    #[serde(default)]
    pub fileclasses: BTreeMap<String, String>,

    #[serde(default)]
    pub policies: Vec<PolicyDef>,

    /// parameters of the purge trigger module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<serde_json::Value>,

    /// text the document was parsed from, used to locate expressions
    #[serde(skip)]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_manager: Option<String>,
    /// boolean expression restricting the entries the policy applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    /// fileclass set expression; absent means every entry in scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub condition: String,
}
