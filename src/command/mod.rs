//! gcloud command synthesis
//!
//! A command is a resource group, a verb, a resource name and an ordered list
//! of flags. Builders decide which flags exist; this module only renders them.
//!
//! - [`firewall`] - `gcloud compute firewall-rules create|delete`
//! - [`instance`] - `gcloud compute instances create|delete`

pub mod firewall;
pub mod instance;

use std::borrow::Cow;
use std::fmt;

/// Which command to emit for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Delete => "delete",
        }
    }
}

/// One `--name='value'` or `--name` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    Value { name: &'static str, value: String },
    Switch(&'static str),
}

impl Flag {
    /// A flag that is always emitted, even with an empty value
    pub fn value(name: &'static str, value: impl Into<String>) -> Self {
        Flag::Value {
            name,
            value: value.into(),
        }
    }

    /// A flag emitted only for a present, non-empty value
    pub fn optional(name: &'static str, value: Option<&str>) -> Option<Self> {
        value
            .filter(|v| !v.is_empty())
            .map(|v| Flag::value(name, v))
    }

    /// A comma-joined list flag, emitted only for a non-empty list
    pub fn list<S: AsRef<str>>(name: &'static str, values: &[S]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Flag::value(name, join_list(values)))
    }

    /// A bare switch, emitted only when on
    pub fn switch(name: &'static str, on: bool) -> Option<Self> {
        on.then_some(Flag::Switch(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Flag::Value { name, .. } | Flag::Switch(name) => *name,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Value { name, value } => write!(f, "--{}={}", name, shell_quote(value)),
            Flag::Switch(name) => write!(f, "--{}", name),
        }
    }
}

/// Join scalars with `,`, no trailing separator
pub fn join_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

/// Single-quote a value for a POSIX shell
///
/// Embedded single quotes close the quoted run, emit an escaped quote and
/// reopen it: `it's` becomes `'it'\''s'`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render a resource name as a shell word
///
/// Names that already follow the GCE naming rules (lowercase letters, digits
/// and `-`) are emitted bare; anything else is single-quoted.
pub fn shell_word(name: &str) -> Cow<'_, str> {
    let bare = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if bare {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(shell_quote(name))
    }
}

/// A complete `gcloud compute ...` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudCommand {
    pub group: &'static str,
    pub verb: Verb,
    pub name: String,
    pub flags: Vec<Flag>,
}

impl GcloudCommand {
    pub fn new(group: &'static str, verb: Verb, name: &str) -> Self {
        Self {
            group,
            verb,
            name: name.to_string(),
            flags: Vec::new(),
        }
    }

    pub fn flag(&mut self, flag: Flag) -> &mut Self {
        self.flags.push(flag);
        self
    }

    /// Append a flag if the builder produced one
    pub fn maybe(&mut self, flag: Option<Flag>) -> &mut Self {
        self.flags.extend(flag);
        self
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name() == name)
    }

    /// Render as one command line, without a line terminator
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GcloudCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gcloud compute {} {} {}",
            self.group,
            self.verb.as_str(),
            shell_word(&self.name)
        )?;
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        Ok(())
    }
}
