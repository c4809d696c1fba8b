//! Batch conversion
//!
//! Turns an exported document into command lines. Each record is converted on
//! its own: a record that cannot be synthesized is reported and skipped, and
//! never affects the lines of the records around it.

use crate::command::instance::DeleteOptions;
use crate::command::{firewall, instance, GcloudCommand};
use crate::error::{RecordError, SynthResult};
use crate::resource::{record_name, FirewallRule, Instance, ResourceKind};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Serialization of an exported document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    #[default]
    Json,
    Yaml,
}

impl InputFormat {
    /// Guess from a file extension; `None` when the extension says nothing
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse an exported document into records
///
/// A top-level array is a `list` export; a single object is a `describe` export.
pub fn parse_document(text: &str, format: InputFormat) -> Result<Vec<Value>> {
    let document: Value = match format {
        InputFormat::Json => serde_json::from_str(text).context("Failed to parse JSON input")?,
        InputFormat::Yaml => serde_yaml::from_str(text).context("Failed to parse YAML input")?,
    };

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Ok(vec![document]),
        Value::Null => Ok(Vec::new()),
        other => Err(anyhow::anyhow!(
            "Expected an array of records or a single record, found: {}",
            other
        )),
    }
}

/// Lines produced for a document, plus the records that were skipped
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub lines: Vec<String>,
    pub errors: Vec<RecordError>,
}

impl ConvertReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Record-to-command converter for one resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    pub kind: ResourceKind,
    pub create: bool,
    pub delete: bool,
    pub delete_options: DeleteOptions,
    pub network_interfaces: bool,
}

impl Converter {
    /// Emits create commands only
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            create: true,
            delete: false,
            delete_options: DeleteOptions::default(),
            network_interfaces: false,
        }
    }

    /// Select commands; asking for neither means create
    pub fn with_modes(mut self, create: bool, delete: bool) -> Self {
        self.create = create || !delete;
        self.delete = delete;
        self
    }

    pub fn with_delete_options(mut self, options: DeleteOptions) -> Self {
        self.delete_options = options;
        self
    }

    pub fn with_network_interfaces(mut self, enabled: bool) -> Self {
        self.network_interfaces = enabled;
        self
    }

    /// Commands for one record, delete first
    pub fn commands(&self, record: &Value) -> SynthResult<Vec<GcloudCommand>> {
        let mut commands = Vec::new();

        match self.kind {
            ResourceKind::FirewallRules => {
                let rule = FirewallRule::from_value(record)?;
                if self.delete {
                    commands.push(firewall::delete_command(&rule));
                }
                if self.create {
                    commands.push(firewall::create_command(&rule)?);
                }
            }
            ResourceKind::Instances => {
                let vm = Instance::from_value(record)?;
                if self.delete {
                    commands.push(instance::delete_command(&vm, &self.delete_options));
                }
                if self.create {
                    commands.push(instance::create_command(&vm, self.network_interfaces)?);
                }
            }
        }

        Ok(commands)
    }

    /// Lines for one record; nothing is emitted for a record that fails
    pub fn convert_record(&self, index: usize, record: &Value) -> Result<Vec<String>, RecordError> {
        let commands = self.commands(record).map_err(|source| RecordError {
            index,
            name: record_name(record),
            source,
        })?;

        tracing::debug!(
            "Converted {} #{} into {} command(s)",
            self.kind.gcloud_group(),
            index,
            commands.len()
        );

        Ok(commands.iter().map(GcloudCommand::to_line).collect())
    }

    /// Lines for every record, in input order
    pub fn convert_all(&self, records: &[Value]) -> ConvertReport {
        let mut report = ConvertReport::default();

        for (index, record) in records.iter().enumerate() {
            match self.convert_record(index, record) {
                Ok(lines) => report.lines.extend(lines),
                Err(err) => {
                    tracing::error!("Skipping {}: {}", self.kind.gcloud_group(), err);
                    report.errors.push(err);
                }
            }
        }

        report
    }
}
