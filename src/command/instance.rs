//! Compute instance commands

use super::{Flag, GcloudCommand, Verb};
use crate::error::{SynthError, SynthResult};
use crate::resource::uri::{machine_type_name, short_name, DiskSource};
use crate::resource::{AttachedDisk, Instance, NetworkInterface};
use serde::{Deserialize, Serialize};
use std::fmt;

const GROUP: &str = "instances";

/// Machine types that do not support `--min-cpu-platform`
pub const SHARED_CORE_MACHINE_TYPES: &[&str] =
    &["e2-micro", "e2-small", "e2-medium", "f1-micro", "g1-small"];

/// Placeholder some exports carry instead of a real platform
const UNKNOWN_CPU_PLATFORM: &str = "Unknown CPU Platform";

/// Prefix of the device names GCE assigns when none is given
const DEFAULT_DEVICE_PREFIX: &str = "persistent-disk-";

/// Disk types accepted by `--delete-disks`/`--keep-disks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiskSelector {
    All,
    Boot,
    Data,
}

impl DiskSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskSelector::All => "all",
            DiskSelector::Boot => "boot",
            DiskSelector::Data => "data",
        }
    }
}

impl fmt::Display for DiskSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disk handling for `gcloud compute instances delete`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub delete_disks: Option<DiskSelector>,
    pub keep_disks: Option<DiskSelector>,
}

pub fn is_shared_core(machine_type: &str) -> bool {
    SHARED_CORE_MACHINE_TYPES.iter().any(|m| *m == machine_type)
}

/// True for names like `persistent-disk-0`
pub fn is_default_device_name(name: &str) -> bool {
    name.strip_prefix(DEFAULT_DEVICE_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn yes_no(on: bool) -> &'static str {
    if on {
        "yes"
    } else {
        "no"
    }
}

/// One `--disk='...'` flag for an attached disk
///
/// `scope=` is `zonal` or `regional`, taken from the source URI's collection
/// segment, not the zone/region name that follows it: those are the only
/// values `gcloud compute instances create --disk scope=` accepts. The
/// location itself stays on [`DiskSource::location`].
pub fn disk_flag(index: usize, disk: &AttachedDisk) -> SynthResult<Flag> {
    let field = format!("disks[{}].source", index);
    let uri = disk
        .source
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SynthError::MissingField(field.clone()))?;
    let source = DiskSource::parse(uri).map_err(|_| SynthError::InvalidUri {
        field,
        uri: uri.to_string(),
    })?;

    let mut parts = vec![
        format!("auto-delete={}", yes_no(disk.auto_delete)),
        format!("boot={}", yes_no(disk.boot)),
    ];

    if let Some(device) = disk.device_name.as_deref().filter(|d| !d.is_empty()) {
        if !is_default_device_name(device) {
            parts.push(format!("device-name={}", device));
        }
    }

    parts.push(format!("force-attach={}", yes_no(disk.force_attach)));

    match disk.mode.as_deref() {
        Some("READ_WRITE") => parts.push("mode=rw".to_string()),
        Some("READ_ONLY") => parts.push("mode=ro".to_string()),
        Some(other) => {
            tracing::debug!("Disk {} has unrecognized mode {}, omitting", source.name, other)
        }
        None => {}
    }

    parts.push(format!("name={}", source.name));
    parts.push(format!("scope={}", source.scope));

    Ok(Flag::value("disk", parts.join(",")))
}

/// One `--network-interface='...'` flag for an interface
///
/// Not part of the default output; enabled with `--network-interfaces`.
pub fn network_interface_flag(nic: &NetworkInterface) -> Option<Flag> {
    let mut parts = Vec::new();

    if let Some(network) = nic.network.as_deref().filter(|n| !n.is_empty()) {
        parts.push(format!("network={}", short_name(network)));
    }
    if let Some(subnet) = nic.subnetwork.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("subnet={}", short_name(subnet)));
    }
    if let Some(ip) = nic.network_ip.as_deref().filter(|ip| !ip.is_empty()) {
        parts.push(format!("private-network-ip={}", ip));
    }

    match nic.access_configs.first() {
        None => parts.push("no-address".to_string()),
        Some(access) => {
            if let Some(tier) = access.network_tier.as_deref().filter(|t| !t.is_empty()) {
                parts.push(format!("network-tier={}", tier));
            }
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(Flag::value("network-interface", parts.join(",")))
}

fn min_cpu_platform_flag(instance: &Instance, machine_type: Option<&str>) -> Option<Flag> {
    if machine_type.is_some_and(is_shared_core) {
        return None;
    }

    let platform = instance
        .min_cpu_platform
        .as_deref()
        .or(instance.cpu_platform.as_deref())
        .filter(|p| *p != UNKNOWN_CPU_PLATFORM);

    Flag::optional("min-cpu-platform", platform)
}

/// `gcloud compute instances create`
pub fn create_command(instance: &Instance, network_interfaces: bool) -> SynthResult<GcloudCommand> {
    let mut command = GcloudCommand::new(GROUP, Verb::Create, &instance.name);

    command
        .maybe(Flag::switch(
            "deletion-protection",
            instance.deletion_protection,
        ))
        .flag(Flag::value(
            "description",
            instance.description.as_deref().unwrap_or_default(),
        ));

    for (index, disk) in instance.disks.iter().enumerate() {
        command.flag(disk_flag(index, disk)?);
    }

    let machine_type = match instance.machine_type.as_deref().filter(|m| !m.is_empty()) {
        Some(uri) => Some(machine_type_name(uri)?),
        None => None,
    };

    command
        .maybe(Flag::optional("machine-type", machine_type))
        .maybe(min_cpu_platform_flag(instance, machine_type))
        .maybe(Flag::optional(
            "zone",
            instance.zone.as_deref().map(short_name),
        ));

    if network_interfaces {
        for nic in &instance.network_interfaces {
            command.maybe(network_interface_flag(nic));
        }
    }

    Ok(command)
}

/// `gcloud compute instances delete`
pub fn delete_command(instance: &Instance, options: &DeleteOptions) -> GcloudCommand {
    let mut command = GcloudCommand::new(GROUP, Verb::Delete, &instance.name);

    command
        .maybe(Flag::optional(
            "zone",
            instance.zone.as_deref().map(short_name),
        ))
        .maybe(
            options
                .delete_disks
                .map(|d| Flag::value("delete-disks", d.as_str())),
        )
        .maybe(
            options
                .keep_disks
                .map(|d| Flag::value("keep-disks", d.as_str())),
        );

    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ZONE: &str = "https://www.googleapis.com/compute/v1/projects/acme/zones/us-east1-b";

    fn instance(value: serde_json::Value) -> Instance {
        Instance::from_value(&value).unwrap()
    }

    fn disk(value: serde_json::Value) -> AttachedDisk {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_default_device_names() {
        assert!(is_default_device_name("persistent-disk-0"));
        assert!(is_default_device_name("persistent-disk-12"));
        assert!(!is_default_device_name("persistent-disk-"));
        assert!(!is_default_device_name("persistent-disk-0a"));
        assert!(!is_default_device_name("data-disk-0"));
        assert!(!is_default_device_name("web-1"));
    }

    #[test]
    fn test_boot_disk_flag() {
        let flag = disk_flag(
            0,
            &disk(json!({
                "autoDelete": true,
                "boot": true,
                "deviceName": "persistent-disk-0",
                "mode": "READ_WRITE",
                "source": format!("{}/disks/web-1", ZONE),
            })),
        )
        .unwrap();
        assert_eq!(
            flag.to_string(),
            "--disk='auto-delete=yes,boot=yes,force-attach=no,mode=rw,name=web-1,scope=zonal'"
        );
    }

    #[test]
    fn test_data_disk_flag_keeps_custom_device_name() {
        let flag = disk_flag(
            1,
            &disk(json!({
                "autoDelete": "false",
                "deviceName": "shared-data",
                "forceAttach": false,
                "mode": "READ_ONLY",
                "source": "projects/acme/regions/us-east1/disks/shared",
            })),
        )
        .unwrap();
        assert_eq!(
            flag.to_string(),
            "--disk='auto-delete=no,boot=no,device-name=shared-data,force-attach=yes,mode=ro,name=shared,scope=regional'"
        );
        assert!(!flag.to_string().contains("us-east1"));
    }

    #[test]
    fn test_unknown_mode_is_omitted() {
        let flag = disk_flag(
            0,
            &disk(json!({"mode": "LOCKED", "source": "zones/us-east1-b/disks/d"})),
        )
        .unwrap();
        assert_eq!(
            flag.to_string(),
            "--disk='auto-delete=no,boot=no,force-attach=no,name=d,scope=zonal'"
        );
    }

    #[test]
    fn test_disk_source_errors() {
        let err = disk_flag(2, &disk(json!({"boot": true}))).unwrap_err();
        assert_eq!(err, SynthError::MissingField("disks[2].source".to_string()));

        let err = disk_flag(0, &disk(json!({"source": "global/images/debian"}))).unwrap_err();
        assert_eq!(
            err,
            SynthError::InvalidUri {
                field: "disks[0].source".to_string(),
                uri: "global/images/debian".to_string(),
            }
        );
    }

    #[test]
    fn test_create_command() {
        let vm = instance(json!({
            "name": "web-1",
            "description": "frontend",
            "deletionProtection": true,
            "zone": ZONE,
            "machineType": format!("{}/machineTypes/n2-standard-4", ZONE),
            "cpuPlatform": "Intel Cascade Lake",
            "disks": [{
                "autoDelete": true,
                "boot": true,
                "deviceName": "persistent-disk-0",
                "mode": "READ_WRITE",
                "source": format!("{}/disks/web-1", ZONE),
            }],
        }));
        assert_eq!(
            create_command(&vm, false).unwrap().to_line(),
            "gcloud compute instances create web-1 --deletion-protection --description='frontend' \
             --disk='auto-delete=yes,boot=yes,force-attach=no,mode=rw,name=web-1,scope=zonal' \
             --machine-type='n2-standard-4' --min-cpu-platform='Intel Cascade Lake' \
             --zone='us-east1-b'"
        );
    }

    #[test]
    fn test_shared_core_suppresses_cpu_platform() {
        for machine_type in SHARED_CORE_MACHINE_TYPES {
            let vm = instance(json!({
                "name": "tiny",
                "machineType": format!("{}/machineTypes/{}", ZONE, machine_type),
                "minCpuPlatform": "Intel Skylake",
                "cpuPlatform": "Intel Broadwell",
            }));
            let command = create_command(&vm, false).unwrap();
            assert!(!command.has_flag("min-cpu-platform"), "{}", machine_type);
            assert!(command.has_flag("machine-type"));
        }
    }

    #[test]
    fn test_min_cpu_platform_preference() {
        let vm = instance(json!({
            "name": "vm",
            "machineType": "n2-standard-2",
            "minCpuPlatform": "Intel Ice Lake",
            "cpuPlatform": "Intel Cascade Lake",
        }));
        let command = create_command(&vm, false).unwrap();
        assert!(command
            .to_line()
            .contains("--min-cpu-platform='Intel Ice Lake'"));

        let vm = instance(json!({"name": "vm", "cpuPlatform": "Unknown CPU Platform"}));
        assert!(!create_command(&vm, false).unwrap().has_flag("min-cpu-platform"));
    }

    #[test]
    fn test_network_interfaces_are_opt_in() {
        let vm = instance(json!({
            "name": "vm",
            "networkInterfaces": [
                {
                    "network": "https://www.googleapis.com/compute/v1/projects/acme/global/networks/vpc",
                    "subnetwork": "https://www.googleapis.com/compute/v1/projects/acme/regions/us-east1/subnetworks/app",
                    "networkIP": "10.0.0.5",
                    "accessConfigs": [{"type": "ONE_TO_ONE_NAT", "networkTier": "PREMIUM"}]
                },
                {"network": "projects/acme/global/networks/backend"}
            ]
        }));

        assert!(!create_command(&vm, false).unwrap().has_flag("network-interface"));
        assert_eq!(
            create_command(&vm, true).unwrap().to_line(),
            "gcloud compute instances create vm --description='' \
             --network-interface='network=vpc,subnet=app,private-network-ip=10.0.0.5,network-tier=PREMIUM' \
             --network-interface='network=backend,no-address'"
        );
    }

    #[test]
    fn test_delete_command() {
        let vm = instance(json!({"name": "vm1", "zone": "us-east1-a"}));
        let options = DeleteOptions {
            delete_disks: Some(DiskSelector::All),
            keep_disks: Some(DiskSelector::Boot),
        };
        assert_eq!(
            delete_command(&vm, &options).to_line(),
            "gcloud compute instances delete vm1 --zone='us-east1-a' --delete-disks='all' --keep-disks='boot'"
        );
        assert_eq!(
            delete_command(&vm, &DeleteOptions::default()).to_line(),
            "gcloud compute instances delete vm1 --zone='us-east1-a'"
        );
    }
}
