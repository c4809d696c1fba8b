//! gcput - regenerate gcloud commands from exported GCP resources
//!
//! Reads the JSON that `gcloud compute firewall-rules list --format=json` or
//! `gcloud compute instances list --format=json` produce and prints the
//! `gcloud compute ... create|delete` commands that recreate those resources.
//!
//! # Module Structure
//!
//! - [`resource`] - Typed records and resource URI parsing
//! - [`command`] - Flag rendering and the per-resource command builders
//! - [`convert`] - Document parsing and per-record batch conversion
//! - [`config`] - Persistent defaults
//! - [`error`] - Synthesis errors
//!
//! # Example
//!
//! ```
//! use gcput::convert::Converter;
//! use gcput::resource::ResourceKind;
//! use serde_json::json;
//!
//! let converter = Converter::new(ResourceKind::FirewallRules);
//! let lines = converter
//!     .convert_record(0, &json!({"name": "fw1", "network": "default"}))
//!     .unwrap();
//! assert_eq!(
//!     lines,
//!     vec!["gcloud compute firewall-rules create fw1 --description='' --network='default'"]
//! );
//! ```

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod resource;

pub use convert::{ConvertReport, Converter, InputFormat};
pub use error::{RecordError, SynthError};
