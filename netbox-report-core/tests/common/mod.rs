#![allow(dead_code)]

use chrono::NaiveDate;
use netbox_report_core::contract::{MockPageFetcher, Page};
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://netbox.example.com";

pub fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn page(next: Option<&str>, results: Vec<Value>) -> Page {
    Page {
        count: None,
        next: next.map(str::to_string),
        results,
    }
}

pub fn device(id: u32, name: &str, site: &str, role_id: u32, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "site": {"id": 1, "name": site},
        "role": {"id": role_id, "name": format!("Role {role_id}")},
        "status": {"value": status, "label": status},
        "serial": format!("SN{id:04}"),
        "primary_ip": {"id": id, "address": "10.0.0.1/24"},
        "custom_fields": {"backup": true, "monitoring": false}
    })
}

pub fn virtual_machine(id: u32, name: &str, site: Option<&str>, role_id: u32, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "site": site.map(|s| json!({"id": 2, "name": s})),
        "role": role_id,
        "status": {"value": status, "label": status},
        "primary_ip": null,
        "custom_fields": {"monitoring": "zabbix"}
    })
}

/// A fetcher that expects each URL exactly once and answers with the given page.
pub fn mock_pages(pages: Vec<(String, Page)>) -> MockPageFetcher {
    let mut fetcher = MockPageFetcher::new();
    for (url, page) in pages {
        fetcher
            .expect_get_page()
            .withf(move |requested| requested == url)
            .times(1)
            .returning(move |_| Ok(page.clone()));
    }
    fetcher
}

pub fn devices_url() -> String {
    format!("{BASE_URL}/api/dcim/devices/?limit=1000")
}

pub fn vms_url() -> String {
    format!("{BASE_URL}/api/virtualization/virtual-machines/?limit=1000")
}
