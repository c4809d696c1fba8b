//! Resource URI grammar
//!
//! Exports reference other resources by self-link, e.g.
//! `https://www.googleapis.com/compute/v1/projects/my-project/zones/us-east1-b/disks/data-1`.
//! Two shapes are understood:
//!
//! - disk source: `[prefix/]<zones|regions>/<location>/disks/<disk>`
//! - machine type: `[prefix/]zones/<zone>/machineTypes/<type>`, or a bare `<type>`
//!
//! Any other reference is reduced to its final path segment by [`short_name`].

use crate::error::{SynthError, SynthResult};
use std::fmt;

/// Where a disk lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskScope {
    Zonal,
    Regional,
}

impl DiskScope {
    fn from_collection(collection: &str) -> Option<Self> {
        match collection {
            "zones" => Some(Self::Zonal),
            "regions" => Some(Self::Regional),
            _ => None,
        }
    }

    /// Value accepted by `--disk=scope=...`
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskScope::Zonal => "zonal",
            DiskScope::Regional => "regional",
        }
    }
}

impl fmt::Display for DiskScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed disk `source` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSource {
    pub scope: DiskScope,
    /// Zone or region name
    pub location: String,
    /// Disk resource name
    pub name: String,
}

impl DiskSource {
    pub fn parse(uri: &str) -> SynthResult<Self> {
        let invalid = || SynthError::InvalidUri {
            field: "disks[].source".to_string(),
            uri: uri.to_string(),
        };

        let segments: Vec<&str> = uri.trim_end_matches('/').split('/').collect();
        let [.., collection, location, kind, name] = segments.as_slice() else {
            return Err(invalid());
        };

        if *kind != "disks" || location.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        let scope = DiskScope::from_collection(collection).ok_or_else(invalid)?;

        Ok(Self {
            scope,
            location: location.to_string(),
            name: name.to_string(),
        })
    }
}

/// Final path segment of a resource reference
/// e.g., "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a" -> "us-central1-a"
pub fn short_name(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

/// Machine type name from a `machineType` reference
pub fn machine_type_name(uri: &str) -> SynthResult<&str> {
    let trimmed = uri.trim_end_matches('/');
    let mut segments = trimmed.rsplit('/');
    let name = segments.next().unwrap_or_default();

    let well_formed = match segments.next() {
        None => true,
        Some(collection) => collection == "machineTypes",
    };

    if name.is_empty() || !well_formed {
        return Err(SynthError::InvalidUri {
            field: "machineType".to_string(),
            uri: uri.to_string(),
        });
    }

    Ok(name)
}
