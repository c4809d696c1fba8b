//! Resource model
//!
//! Typed views of the records found in `gcloud compute ... --format=json`
//! exports.
//!
//! # Architecture
//!
//! - [`record`] - Firewall rule and instance records with normalized fields
//! - [`uri`] - Grammar for the resource self-links records refer to
//!
//! # Example
//!
//! ```
//! use gcput::resource::FirewallRule;
//! use serde_json::json;
//!
//! let rule = FirewallRule::from_value(&json!({"name": "allow-ssh", "priority": 1000})).unwrap();
//! assert_eq!(rule.priority.as_deref(), Some("1000"));
//! ```

pub mod record;
pub mod uri;

pub use record::{
    record_name, AccessConfig, AttachedDisk, FirewallRule, Instance, LogConfig, NetworkInterface,
    RuleEntry,
};

/// Resource families this tool converts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    FirewallRules,
    Instances,
}

impl ResourceKind {
    /// `gcloud compute <group>` for this kind
    pub fn gcloud_group(&self) -> &'static str {
        match self {
            ResourceKind::FirewallRules => "firewall-rules",
            ResourceKind::Instances => "instances",
        }
    }
}
