//! Typed resource records
//!
//! Records are decoded from the JSON tree `gcloud ... list/describe --format=json`
//! produces. Optional fields decode to `None`/empty so the command builders can
//! suppress their flags with plain checks. Exports are not consistent about
//! booleans and numbers, so both are normalized here:
//!
//! - boolean fields accept JSON `true` or the strings `"true"`/`"True"`
//!   (firewall exports historically use `"True"`, instance exports `"true"`)
//! - scalar fields such as `priority` accept strings or numbers

use crate::error::{SynthError, SynthResult};
use serde::de::{self, Deserializer, IgnoredAny};
use serde::Deserialize;
use serde_json::Value;

/// One clause of a firewall rule's `allowed`/`denied` list
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RuleEntry {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,
    #[serde(default, deserialize_with = "opt_scalar_list")]
    pub ports: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default, deserialize_with = "flag")]
    pub enable: bool,
}

/// A firewall rule export
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub priority: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub disabled: bool,
    #[serde(default)]
    pub log_config: Option<LogConfig>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub destination_ranges: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub source_ranges: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub source_service_accounts: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub target_service_accounts: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub source_tags: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub target_tags: Vec<String>,
    #[serde(default)]
    pub allowed: Option<Vec<RuleEntry>>,
    #[serde(default)]
    pub denied: Option<Vec<RuleEntry>>,
}

impl FirewallRule {
    pub fn from_value(value: &Value) -> SynthResult<Self> {
        let rule: Self = decode(value)?;
        require_name(&rule.name)?;
        Ok(rule)
    }

    pub fn logging_enabled(&self) -> bool {
        self.log_config.as_ref().is_some_and(|c| c.enable)
    }
}

/// A disk attached to an instance
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(default, deserialize_with = "flag")]
    pub auto_delete: bool,
    #[serde(default, deserialize_with = "flag")]
    pub boot: bool,
    #[serde(default)]
    pub device_name: Option<String>,
    /// Only the key's presence matters, not its value
    #[serde(default, deserialize_with = "present")]
    pub force_attach: bool,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(default)]
    pub network_tier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub subnetwork: Option<String>,
    #[serde(default, rename = "networkIP")]
    pub network_ip: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub access_configs: Vec<AccessConfig>,
}

/// A compute instance export
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub min_cpu_platform: Option<String>,
    #[serde(default)]
    pub cpu_platform: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub deletion_protection: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub disks: Vec<AttachedDisk>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub network_interfaces: Vec<NetworkInterface>,
}

impl Instance {
    pub fn from_value(value: &Value) -> SynthResult<Self> {
        let instance: Self = decode(value)?;
        require_name(&instance.name)?;
        Ok(instance)
    }
}

/// The `name` of a raw record, for error attribution
pub fn record_name(value: &Value) -> Option<String> {
    value
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value) -> SynthResult<T> {
    if !value.is_object() {
        return Err(SynthError::Decode(format!(
            "expected an object, found {}",
            kind_of(value)
        )));
    }
    T::deserialize(value).map_err(|e| SynthError::Decode(e.to_string()))
}

fn require_name(name: &str) -> SynthResult<()> {
    if name.is_empty() {
        return Err(SynthError::MissingField("name".to_string()));
    }
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_to_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!(
            "expected a string or number, found {}",
            kind_of(&other)
        ))),
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    scalar_to_text(Value::deserialize(deserializer)?)
}

fn opt_scalar_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let Some(items) = Option::<Vec<Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut list = Vec::with_capacity(items.len());
    for item in items {
        if let Some(text) = scalar_to_text::<D::Error>(item)? {
            list.push(text);
        }
    }
    Ok(Some(list))
}

fn scalar_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(opt_scalar_list(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_casings_normalize() {
        for (raw, expected) in [
            (json!(true), true),
            (json!("True"), true),
            (json!("true"), true),
            (json!(false), false),
            (json!("False"), false),
            (json!("yes"), false),
            (json!(null), false),
        ] {
            let rule =
                FirewallRule::from_value(&json!({"name": "fw", "disabled": raw.clone()})).unwrap();
            assert_eq!(rule.disabled, expected, "disabled = {}", raw);
        }
    }

    #[test]
    fn test_priority_accepts_number_or_string() {
        let numeric = FirewallRule::from_value(&json!({"name": "fw", "priority": 1000})).unwrap();
        let text = FirewallRule::from_value(&json!({"name": "fw", "priority": "1000"})).unwrap();
        assert_eq!(numeric.priority.as_deref(), Some("1000"));
        assert_eq!(numeric.priority, text.priority);
    }

    #[test]
    fn test_null_lists_are_empty() {
        let rule = FirewallRule::from_value(&json!({
            "name": "fw",
            "sourceRanges": null,
            "targetTags": [],
        }))
        .unwrap();
        assert!(rule.source_ranges.is_empty());
        assert!(rule.target_tags.is_empty());
        assert!(rule.allowed.is_none());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = FirewallRule::from_value(&json!({"network": "default"})).unwrap_err();
        assert_eq!(err, SynthError::MissingField("name".to_string()));

        let err = Instance::from_value(&json!({"name": ""})).unwrap_err();
        assert_eq!(err, SynthError::MissingField("name".to_string()));
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        let err = Instance::from_value(&json!(["vm1"])).unwrap_err();
        assert_eq!(err, SynthError::Decode("expected an object, found an array".to_string()));
    }

    #[test]
    fn test_rule_entry_ports() {
        let rule = FirewallRule::from_value(&json!({
            "name": "fw",
            "allowed": [
                {"IPProtocol": "tcp", "ports": ["80", 443]},
                {"IPProtocol": "icmp"}
            ]
        }))
        .unwrap();
        let allowed = rule.allowed.unwrap();
        assert_eq!(allowed[0].ports, Some(vec!["80".to_string(), "443".to_string()]));
        assert_eq!(allowed[1].ports, None);
    }

    #[test]
    fn test_force_attach_presence() {
        let instance = Instance::from_value(&json!({
            "name": "vm1",
            "disks": [
                {"source": "zones/z/disks/a", "forceAttach": false},
                {"source": "zones/z/disks/b"}
            ]
        }))
        .unwrap();
        assert!(instance.disks[0].force_attach);
        assert!(!instance.disks[1].force_attach);
    }

    #[test]
    fn test_access_config_keeps_only_network_tier() {
        let instance = Instance::from_value(&json!({
            "name": "vm1",
            "networkInterfaces": [{
                "network": "global/networks/default",
                "accessConfigs": [{
                    "kind": "compute#accessConfig",
                    "name": "External NAT",
                    "natIP": "34.75.10.20",
                    "networkTier": "PREMIUM",
                    "type": "ONE_TO_ONE_NAT"
                }]
            }]
        }))
        .unwrap();
        assert_eq!(
            instance.network_interfaces[0].access_configs,
            vec![AccessConfig {
                network_tier: Some("PREMIUM".to_string()),
            }]
        );
    }

    #[test]
    fn test_record_name() {
        assert_eq!(record_name(&json!({"name": "vm1"})), Some("vm1".to_string()));
        assert_eq!(record_name(&json!({"name": ""})), None);
        assert_eq!(record_name(&json!({"name": 7})), None);
        assert_eq!(record_name(&json!("vm1")), None);
    }
}
