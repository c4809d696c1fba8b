//! Synthesis errors
//!
//! Optional fields never produce errors; they only suppress their flags.
//! Everything in here means a record cannot be turned into a command.

use thiserror::Error;

/// Result alias for synthesis of a single record
pub type SynthResult<T> = std::result::Result<T, SynthError>;

/// Why a record could not be synthesized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// A field the command cannot be built without is absent or null
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong shape
    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// A tcp/udp rule entry without a port list
    #[error("{list}[{entry}]: protocol '{protocol}' requires a 'ports' list")]
    MissingPorts {
        list: &'static str,
        entry: usize,
        protocol: String,
    },

    /// A resource URI that does not follow the expected grammar
    #[error("field '{field}' is not a recognized resource URI: '{uri}'")]
    InvalidUri { field: String, uri: String },

    /// The record does not deserialize into the expected resource shape
    #[error("{0}")]
    Decode(String),
}

impl SynthError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A synthesis failure attributed to one input record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record #{index}{}: {source}", name_suffix(.name))]
pub struct RecordError {
    /// Position of the record in its input document
    pub index: usize,
    /// The record's `name`, when it has one
    pub name: Option<String>,
    #[source]
    pub source: SynthError,
}

fn name_suffix(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" ({})", name),
        None => String::new(),
    }
}
