mod common;

use common::*;
use netbox_report_core::aggregate::{Inventory, RoleCounts};
use netbox_report_core::fetch::RawInventory;
use netbox_report_core::model::CustomFieldKeys;
use netbox_report_core::report::decode_items;
use netbox_report_core::taxonomy::{Classification, Taxonomy};

fn sample_items() -> Vec<netbox_report_core::model::Item> {
    let raw = RawInventory {
        devices: vec![
            device(1, "sw-b", "AMS1", 2, "active"),
            device(2, "sw-a", "AMS1", 2, "active"),
            device(3, "fw-01", "AMS1", 4, "active"),
            device(4, "old-router", "AMS1", 3, "decommissioning"),
            device(5, "patch-01", "AMS1", 50, "active"),
            device(6, "mystery", "FRA2", 4242, "active"),
            device(7, "ups-01", "FRA2", 30, "planned"),
        ],
        virtual_machines: vec![
            virtual_machine(100, "db-01", Some("FRA2"), 13, "active"),
            virtual_machine(101, "app-01", None, 12, "active"),
            virtual_machine(102, "app-02", None, 12, "offline"),
        ],
    };
    decode_items(raw, &CustomFieldKeys::default()).expect("sample payloads decode")
}

#[test]
fn inactive_and_excluded_items_never_reach_a_bucket() {
    let taxonomy = Taxonomy::builtin();
    let inventory = Inventory::accumulate(sample_items(), &taxonomy);

    let all_names: Vec<&str> = inventory
        .sites
        .values()
        .flat_map(|buckets| buckets.values())
        .flat_map(|bucket| bucket.items.iter())
        .map(|item| item.name.as_str())
        .collect();

    for dropped in ["old-router", "ups-01", "app-02", "patch-01"] {
        assert!(!all_names.contains(&dropped), "{dropped} should be excluded");
    }
    assert_eq!(inventory.skipped_inactive, 3);
    assert_eq!(inventory.skipped_excluded, 1);
}

#[test]
fn bucket_total_equals_active_non_excluded_items() {
    let taxonomy = Taxonomy::builtin();
    let items = sample_items();
    let expected = items
        .iter()
        .filter(|item| item.is_active() && !taxonomy.is_excluded(item.role_id))
        .count();

    let inventory = Inventory::accumulate(items, &taxonomy);

    assert_eq!(inventory.total(), expected);
    assert_eq!(inventory.total(), 6);
    let bucket_sum: usize = inventory
        .sites
        .values()
        .flat_map(|buckets| buckets.values())
        .map(|bucket| {
            assert_eq!(bucket.count, bucket.items.len());
            bucket.count
        })
        .sum();
    assert_eq!(bucket_sum, expected);
}

#[test]
fn unknown_roles_land_in_other_other() {
    let taxonomy = Taxonomy::builtin();
    let inventory = Inventory::accumulate(sample_items(), &taxonomy);

    let fra2 = &inventory.sites["FRA2"];
    let other = &fra2[&Classification::other()];
    assert_eq!(other.count, 1);
    assert_eq!(other.items[0].name, "mystery");
}

#[test]
fn sites_and_items_are_sorted_and_buckets_follow_taxonomy_order() {
    let taxonomy = Taxonomy::builtin();
    let inventory = Inventory::accumulate(sample_items(), &taxonomy);

    let sites: Vec<&str> = inventory.sites.keys().map(String::as_str).collect();
    assert_eq!(sites, vec!["AMS1", "FRA2", "Unassigned Site"]);

    let ams1 = inventory.ordered_buckets("AMS1", &taxonomy);
    let keys: Vec<(&str, &str)> = ams1
        .iter()
        .map(|(class, _)| (class.heading.as_str(), class.subheading.as_str()))
        .collect();
    assert_eq!(keys, vec![("Network", "Access Switches"), ("Network", "Firewalls")]);

    let switch_names: Vec<&str> = ams1[0]
        .1
        .sorted_items()
        .into_iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(switch_names, vec!["sw-a", "sw-b"]);

    let fra2 = inventory.ordered_buckets("FRA2", &taxonomy);
    let headings: Vec<&str> = fra2.iter().map(|(class, _)| class.heading.as_str()).collect();
    assert_eq!(headings, vec!["Compute", "Other"], "Other always renders last");
}

#[test]
fn heading_totals_span_all_sites() {
    let taxonomy = Taxonomy::builtin();
    let inventory = Inventory::accumulate(sample_items(), &taxonomy);
    assert_eq!(
        inventory.heading_totals(&taxonomy),
        vec![
            ("Network".to_string(), 3),
            ("Compute".to_string(), 2),
            ("Other".to_string(), 1),
        ]
    );
}

#[test]
fn role_counts_include_every_device() {
    let items = sample_items();
    let devices: Vec<_> = items
        .iter()
        .filter(|item| item.kind == netbox_report_core::model::ItemKind::Device)
        .collect();
    let counts = RoleCounts::accumulate(devices.iter().copied());

    assert_eq!(counts.total(), 7);
    assert_eq!(counts.sites["AMS1"]["Role 2"], 2);
    assert_eq!(counts.sites["FRA2"]["Role 4242"], 1);
}
