use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

////////////////////////////////////////////////////////////
// Listener configuration
////////////////////////////////////////////////////////////

/// Default disposition for traffic that matches no explicit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Policy {
    #[serde(rename = "ALLOW")]
    Allow,

    #[serde(rename = "DENY")]
    Deny,
}

impl Default for Policy {
    fn default() -> Self {
        Self::Allow
    }
}

/// Per-listener allow rules: exact host names and wildcard patterns.
/// Both lists are duplicate-free; insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ListenerRules {
    #[serde(default)]
    pub static_hosts: Vec<String>,

    #[serde(default)]
    pub patterns: Vec<String>,
}

/// A configured bind point forwarding to a target port. The listener
/// name is not part of this struct: on the wire listeners travel as a
/// name-keyed map, and locally they live in an ordered (name, Listener)
/// list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Listener {
    pub bind: String,

    pub target_port: u16,

    #[serde(default = "default_max_idle_time_ms")]
    pub max_idle_time_ms: u64,

    #[serde(default)]
    pub policy: Policy,

    #[serde(default)]
    pub rules: ListenerRules,
}

fn default_max_idle_time_ms() -> u64 {
    600_000
}

impl Listener {
    pub fn new(bind: String, target_port: u16) -> Self {
        Self {
            bind,
            target_port,
            max_idle_time_ms: default_max_idle_time_ms(),
            policy: Policy::default(),
            rules: ListenerRules::default(),
        }
    }
}

////////////////////////////////////////////////////////////
// Runtime status and statistics
////////////////////////////////////////////////////////////

/// Per-listener runtime outcome as the server serializes it:
/// `{"Ok":true}` or `{"Err":{"message":"..."}}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ListenerStatus {
    Ok(bool),
    Err { message: String },
}

impl ListenerStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ListenerStats {
    pub name: String,
    pub total: u64,
    pub active: u64,
    pub downloaded_bytes: u64,
    pub uploaded_bytes: u64,
}

////////////////////////////////////////////////////////////
// Operation outcomes
////////////////////////////////////////////////////////////

/// Whole-service outcome, e.g. a stop request against an already
/// stopped service comes back `{success: true, changed: false}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimpleResult {
    pub success: bool,
    pub changed: bool,

    #[serde(default)]
    pub message: Option<String>,
}

/// A lifecycle endpoint answers either with a service-level
/// `SimpleResult` or with a per-listener status map, with no tag to
/// tell them apart. Decode once at the boundary; everything downstream
/// matches on this enum instead of re-inspecting the payload shape.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Simple(SimpleResult),
    PerListener(HashMap<String, ListenerStatus>),
}

impl OperationOutcome {
    /// Shape heuristic: only a `SimpleResult` carries both a `success`
    /// and a `changed` field; any other object is a listener map.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if let Some(obj) = value.as_object() {
            if obj.contains_key("success") && obj.contains_key("changed") {
                let simple: SimpleResult = serde_json::from_value(value)?;
                return Ok(Self::Simple(simple));
            }
        }

        let per_listener: HashMap<String, ListenerStatus> = serde_json::from_value(value)
            .map_err(|e| Error::GatewayError(format!("unrecognized outcome payload: {}", e)))?;
        Ok(Self::PerListener(per_listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_deserialize() {
        let json = r#"
        {
            "bind": "0.0.0.0:443",
            "target_port": 8443,
            "policy": "DENY",
            "rules": {
                "static_hosts": ["a.example.com"],
                "patterns": ["*.example.org"]
            }
        }
        "#;

        let listener: Listener = serde_json::from_str(json).unwrap();
        assert_eq!(listener.bind, "0.0.0.0:443");
        assert_eq!(listener.target_port, 8443);
        assert_eq!(listener.policy, Policy::Deny);
        assert_eq!(listener.max_idle_time_ms, 600_000);
        assert_eq!(listener.rules.static_hosts, vec!["a.example.com"]);
        assert_eq!(listener.rules.patterns, vec!["*.example.org"]);
    }

    #[test]
    fn test_listener_status_deserialize() {
        let json = r#"{"l1":{"Ok":true},"l2":{"Err":{"message":"invalid socket address"}}}"#;

        let statuses: HashMap<String, ListenerStatus> = serde_json::from_str(json).unwrap();
        assert_eq!(statuses["l1"], ListenerStatus::Ok(true));
        assert_eq!(
            statuses["l2"],
            ListenerStatus::Err {
                message: "invalid socket address".to_string()
            }
        );
    }

    #[test]
    fn test_outcome_simple_shape() {
        let value = serde_json::json!({
            "success": true,
            "changed": false,
            "message": null
        });

        let outcome = OperationOutcome::from_value(value).unwrap();
        match outcome {
            OperationOutcome::Simple(simple) => {
                assert!(simple.success);
                assert!(!simple.changed);
                assert_eq!(simple.message, None);
            }
            OperationOutcome::PerListener(_) => panic!("simple result decoded as listener map"),
        }
    }

    #[test]
    fn test_outcome_per_listener_shape() {
        let value = serde_json::json!({
            "a": {"Ok": true},
            "b": {"Err": {"message": "bad address"}}
        });

        let outcome = OperationOutcome::from_value(value).unwrap();
        match outcome {
            OperationOutcome::PerListener(map) => {
                assert_eq!(map.len(), 2);
                assert!(map["a"].is_ok());
                assert!(!map["b"].is_ok());
            }
            OperationOutcome::Simple(_) => panic!("listener map decoded as simple result"),
        }
    }

    #[test]
    fn test_outcome_unrecognized_payload_is_gateway_error() {
        let value = serde_json::json!({"a": 42});

        let err = OperationOutcome::from_value(value).unwrap_err();
        assert!(matches!(err, Error::GatewayError(_)));
        assert!(err.to_string().contains("unrecognized outcome payload"));
    }
}
