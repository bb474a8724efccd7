//! Role classification: maps a NetBox role ID onto the two-level
//! heading/subheading taxonomy used by the inventory report.
//!
//! The table is small and static, so lookups are a linear scan in declaration
//! order and the first matching rule wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const OTHER: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Classification {
    pub heading: String,
    pub subheading: String,
}

impl Classification {
    pub fn new(heading: &str, subheading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            subheading: subheading.to_string(),
        }
    }

    pub fn other() -> Self {
        Self::new(OTHER, OTHER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub id: u32,
    pub heading: String,
    pub subheading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Render order of headings. Headings used by rules but missing here are
    /// appended in first-use order; `Other` always sorts last.
    #[serde(default)]
    pub headings: Vec<String>,
    pub roles: Vec<RoleRule>,
    #[serde(default)]
    pub excluded_roles: Vec<u32>,
}

const BUILTIN_HEADINGS: &[&str] = &["Network", "Compute", "Storage", "Facilities"];

const BUILTIN_ROLES: &[(u32, &str, &str)] = &[
    (1, "Network", "Core Switches"),
    (2, "Network", "Access Switches"),
    (3, "Network", "Routers"),
    (4, "Network", "Firewalls"),
    (5, "Network", "Wireless"),
    (6, "Network", "Wireless"),
    (7, "Network", "Load Balancers"),
    (8, "Network", "Out-of-Band"),
    (9, "Network", "VPN Gateways"),
    (10, "Compute", "Hypervisors"),
    (11, "Compute", "Bare Metal Servers"),
    (12, "Compute", "Application Servers"),
    (13, "Compute", "Database Servers"),
    (14, "Compute", "Web Servers"),
    (15, "Compute", "Domain Controllers"),
    (16, "Compute", "Monitoring"),
    (17, "Compute", "Build Agents"),
    (18, "Compute", "Jump Hosts"),
    (19, "Compute", "Containers"),
    (20, "Storage", "SAN"),
    (21, "Storage", "NAS"),
    (22, "Storage", "Backup Appliances"),
    (23, "Storage", "Tape Libraries"),
    (24, "Storage", "Object Storage"),
    (30, "Facilities", "UPS"),
    (31, "Facilities", "PDUs"),
    (32, "Facilities", "Environmental Sensors"),
    (33, "Facilities", "KVM"),
    (34, "Facilities", "Console Servers"),
    (35, "Facilities", "Cameras"),
    (36, "Facilities", "Access Control"),
];

/// Passive rack furniture that never shows up in the report.
const BUILTIN_EXCLUDED: &[u32] = &[50, 51, 52, 53];

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Taxonomy {
    /// The hard-coded table shipped with the binary.
    pub fn builtin() -> Self {
        Taxonomy {
            headings: BUILTIN_HEADINGS.iter().map(|h| h.to_string()).collect(),
            roles: BUILTIN_ROLES
                .iter()
                .map(|&(id, heading, subheading)| RoleRule {
                    id,
                    heading: heading.to_string(),
                    subheading: subheading.to_string(),
                })
                .collect(),
            excluded_roles: BUILTIN_EXCLUDED.to_vec(),
        }
    }

    /// Looks up a role ID. Unknown or missing IDs fall into `Other/Other`.
    pub fn classify(&self, role_id: Option<u32>) -> Classification {
        let Some(id) = role_id else {
            return Classification::other();
        };
        match self.roles.iter().find(|rule| rule.id == id) {
            Some(rule) => Classification::new(&rule.heading, &rule.subheading),
            None => {
                debug!(role_id = id, "Role not in taxonomy, classifying as Other");
                Classification::other()
            }
        }
    }

    pub fn is_excluded(&self, role_id: Option<u32>) -> bool {
        role_id.is_some_and(|id| self.excluded_roles.contains(&id))
    }

    /// Headings in render order, always ending with `Other`.
    pub fn heading_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let declared = self.headings.iter().map(String::as_str);
        let from_rules = self.roles.iter().map(|rule| rule.heading.as_str());
        for heading in declared.chain(from_rules) {
            if heading != OTHER && !order.iter().any(|h| h == heading) {
                order.push(heading.to_string());
            }
        }
        order.push(OTHER.to_string());
        order
    }

    /// Subheadings of one heading in first-declared order.
    pub fn subheading_order(&self, heading: &str) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for rule in self.roles.iter().filter(|rule| rule.heading == heading) {
            if !order.contains(&rule.subheading) {
                order.push(rule.subheading.clone());
            }
        }
        if heading == OTHER && !order.iter().any(|s| s == OTHER) {
            order.push(OTHER.to_string());
        }
        order
    }

    pub fn trace_loaded(&self) {
        info!(
            rules = self.roles.len(),
            excluded = self.excluded_roles.len(),
            headings = ?self.heading_order(),
            "Loaded role taxonomy"
        );
    }
}
