//! Firewall rule commands

use super::{Flag, GcloudCommand, Verb};
use crate::error::{SynthError, SynthResult};
use crate::resource::{FirewallRule, RuleEntry};

const GROUP: &str = "firewall-rules";

/// Which rule list a set of entries came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Allow,
    Deny,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Allow => "ALLOW",
            RuleAction::Deny => "DENY",
        }
    }

    fn list_name(&self) -> &'static str {
        match self {
            RuleAction::Allow => "allowed",
            RuleAction::Deny => "denied",
        }
    }
}

/// Flatten rule entries into `protocol[:port]` tokens
///
/// tcp and udp expand to one token per port, in input order. Every other
/// protocol renders bare, ports or not.
pub fn rule_tokens(action: RuleAction, entries: &[RuleEntry]) -> SynthResult<Vec<String>> {
    let mut tokens = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let protocol = entry.ip_protocol.as_str();
        match protocol {
            "tcp" | "udp" => {
                let ports = entry
                    .ports
                    .as_ref()
                    .filter(|ports| !ports.is_empty())
                    .ok_or_else(|| SynthError::MissingPorts {
                        list: action.list_name(),
                        entry: index,
                        protocol: protocol.to_string(),
                    })?;
                tokens.extend(ports.iter().map(|port| format!("{}:{}", protocol, port)));
            }
            _ => tokens.push(protocol.to_string()),
        }
    }

    Ok(tokens)
}

/// `--action` and `--rules` for one rule list; nothing for an absent or empty list
pub fn action_flags(action: RuleAction, entries: Option<&[RuleEntry]>) -> SynthResult<Vec<Flag>> {
    let Some(entries) = entries.filter(|e| !e.is_empty()) else {
        return Ok(Vec::new());
    };

    let tokens = rule_tokens(action, entries)?;
    let rules = Flag::list("rules", &tokens)
        .ok_or_else(|| SynthError::invalid(action.list_name(), "no rule tokens"))?;
    Ok(vec![Flag::value("action", action.as_str()), rules])
}

/// `gcloud compute firewall-rules create`
pub fn create_command(rule: &FirewallRule) -> SynthResult<GcloudCommand> {
    let mut command = GcloudCommand::new(GROUP, Verb::Create, &rule.name);

    command
        .flag(Flag::value(
            "description",
            rule.description.as_deref().unwrap_or_default(),
        ))
        .maybe(Flag::optional("direction", rule.direction.as_deref()))
        .maybe(Flag::optional("priority", rule.priority.as_deref()))
        .maybe(Flag::optional("network", rule.network.as_deref()))
        .maybe(Flag::switch("disabled", rule.disabled))
        .maybe(Flag::switch("enable-logging", rule.logging_enabled()))
        .maybe(Flag::list("destination-ranges", &rule.destination_ranges))
        .maybe(Flag::list("source-ranges", &rule.source_ranges))
        .maybe(Flag::list(
            "source-service-accounts",
            &rule.source_service_accounts,
        ))
        .maybe(Flag::list(
            "target-service-accounts",
            &rule.target_service_accounts,
        ))
        .maybe(Flag::list("source-tags", &rule.source_tags))
        .maybe(Flag::list("target-tags", &rule.target_tags));

    command
        .flags
        .extend(action_flags(RuleAction::Allow, rule.allowed.as_deref())?);
    command
        .flags
        .extend(action_flags(RuleAction::Deny, rule.denied.as_deref())?);

    if rule.allowed.as_ref().is_some_and(|a| !a.is_empty())
        && rule.denied.as_ref().is_some_and(|d| !d.is_empty())
    {
        tracing::warn!(
            "Firewall rule {} has both allowed and denied entries; emitting both actions",
            rule.name
        );
    }

    Ok(command)
}

/// `gcloud compute firewall-rules delete`
pub fn delete_command(rule: &FirewallRule) -> GcloudCommand {
    let mut command = GcloudCommand::new(GROUP, Verb::Delete, &rule.name);
    command.maybe(Flag::optional("network", rule.network.as_deref()));
    command
}
