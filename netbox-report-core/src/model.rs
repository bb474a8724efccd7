use serde::Deserialize;
use std::collections::HashMap;

// --- NetBox API types ---

/// Nested object reference as NetBox embeds it (`site`, `role`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct NestedRef {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

impl NestedRef {
    fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.display.as_deref())
    }
}

/// A role is either a bare numeric ID or an embedded object, depending on the
/// NetBox version and the `brief`/`expand` query options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    Id(u32),
    Nested(NestedRef),
}

impl RoleRef {
    pub fn id(&self) -> u32 {
        match self {
            RoleRef::Id(id) => *id,
            RoleRef::Nested(nested) => nested.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RoleRef::Id(_) => None,
            RoleRef::Nested(nested) => nested.label(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChoice {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusField {
    Choice(StatusChoice),
    Plain(String),
}

impl StatusField {
    pub fn value(&self) -> &str {
        match self {
            StatusField::Choice(choice) => &choice.value,
            StatusField::Plain(value) => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbDevice {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub role: Option<RoleRef>,
    /// Pre-3.6 name of `role`; still emitted alongside it by some versions.
    #[serde(default)]
    pub device_role: Option<RoleRef>,
    #[serde(default)]
    pub status: Option<StatusField>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub primary_ip: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_ip4: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_ip6: Option<serde_json::Value>,
    #[serde(default)]
    pub custom_fields: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbVirtualMachine {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub role: Option<RoleRef>,
    #[serde(default)]
    pub status: Option<StatusField>,
    #[serde(default)]
    pub primary_ip: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_ip4: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_ip6: Option<serde_json::Value>,
    #[serde(default)]
    pub custom_fields: Option<HashMap<String, serde_json::Value>>,
}

// --- Report items ---

pub const UNASSIGNED_SITE: &str = "Unassigned Site";
pub const UNKNOWN_ROLE: &str = "Unknown Role";
pub const ACTIVE_STATUS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemKind {
    Device,
    VirtualMachine,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Device => "Device",
            ItemKind::VirtualMachine => "VM",
        }
    }
}

/// Custom field keys consulted for the backup and monitoring columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldKeys {
    pub backup: String,
    pub monitoring: String,
}

impl Default for CustomFieldKeys {
    fn default() -> Self {
        Self {
            backup: "backup".to_string(),
            monitoring: "monitoring".to_string(),
        }
    }
}

/// A device or virtual machine reduced to the fields the reports consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub id: u32,
    pub name: String,
    pub description: String,
    pub site: String,
    pub role_id: Option<u32>,
    pub role_name: Option<String>,
    pub status: String,
    pub has_primary_ip: bool,
    pub serial: String,
    pub backup: bool,
    pub monitored: bool,
}

impl Item {
    pub fn from_device(device: NbDevice, keys: &CustomFieldKeys) -> Self {
        let role = device.role.or(device.device_role);
        let custom_fields = device.custom_fields.unwrap_or_default();
        Item {
            kind: ItemKind::Device,
            id: device.id,
            name: item_name(device.name, device.id),
            description: device.description.unwrap_or_default(),
            site: site_name(device.site.as_ref()),
            role_id: role.as_ref().map(RoleRef::id),
            role_name: role.as_ref().and_then(|r| r.name()).map(str::to_string),
            status: device
                .status
                .as_ref()
                .map(|s| s.value().to_string())
                .unwrap_or_default(),
            has_primary_ip: has_ip(&device.primary_ip)
                || has_ip(&device.primary_ip4)
                || has_ip(&device.primary_ip6),
            serial: device.serial.unwrap_or_default(),
            backup: custom_field_flag(&custom_fields, &keys.backup),
            monitored: custom_field_flag(&custom_fields, &keys.monitoring),
        }
    }

    pub fn from_virtual_machine(vm: NbVirtualMachine, keys: &CustomFieldKeys) -> Self {
        let custom_fields = vm.custom_fields.unwrap_or_default();
        Item {
            kind: ItemKind::VirtualMachine,
            id: vm.id,
            name: item_name(vm.name, vm.id),
            description: vm.description.unwrap_or_default(),
            site: site_name(vm.site.as_ref()),
            role_id: vm.role.as_ref().map(RoleRef::id),
            role_name: vm.role.as_ref().and_then(|r| r.name()).map(str::to_string),
            status: vm
                .status
                .as_ref()
                .map(|s| s.value().to_string())
                .unwrap_or_default(),
            has_primary_ip: has_ip(&vm.primary_ip)
                || has_ip(&vm.primary_ip4)
                || has_ip(&vm.primary_ip6),
            serial: String::new(),
            backup: custom_field_flag(&custom_fields, &keys.backup),
            monitored: custom_field_flag(&custom_fields, &keys.monitoring),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(ACTIVE_STATUS)
    }

    pub fn role_label(&self) -> &str {
        self.role_name.as_deref().unwrap_or(UNKNOWN_ROLE)
    }
}

fn item_name(name: Option<String>, id: u32) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => format!("<unnamed #{id}>"),
    }
}

fn site_name(site: Option<&NestedRef>) -> String {
    site.and_then(NestedRef::label)
        .unwrap_or(UNASSIGNED_SITE)
        .to_string()
}

fn has_ip(value: &Option<serde_json::Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

/// Interprets a custom field as a presence flag.
pub fn custom_field_flag(fields: &HashMap<String, serde_json::Value>, key: &str) -> bool {
    use serde_json::Value;
    match fields.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            let s = s.trim();
            !(s.is_empty()
                || s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("no")
                || s == "0")
        }
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
