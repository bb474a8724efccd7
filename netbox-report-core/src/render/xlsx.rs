//! Spreadsheet output: a `Summary` sheet followed by one sheet per site.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::aggregate::{percentage, Inventory};
use crate::layout::{generated_on, item_row, INVENTORY_TITLE};
use crate::taxonomy::Taxonomy;

const SHEET_NAME_MAX: usize = 31;
const SUMMARY_SHEET: &str = "Summary";
const TICK: &str = "\u{2713}";

const ITEM_HEADERS: &[(&str, f64)] = &[
    ("Heading", 14.0),
    ("Subheading", 22.0),
    ("Name", 28.0),
    ("Kind", 8.0),
    ("Description", 40.0),
    ("Serial", 20.0),
    ("Primary IP", 11.0),
    ("Backup", 9.0),
    ("Monitoring", 11.0),
];

/// Excel sheet names are limited to 31 characters, may not contain
/// `[ ] : * ? / \` and may not start or end with an apostrophe. Names are
/// compared case-insensitively; names already taken get a numeric suffix.
pub fn sheet_name(site: &str, taken: &[String]) -> String {
    let cleaned: String = site
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let cleaned = trim_sheet_name(&cleaned);
    let base = if cleaned.is_empty() {
        "Site".to_string()
    } else {
        truncate_sheet_name(cleaned, SHEET_NAME_MAX)
    };

    let is_taken = |name: &str| {
        let lower = name.to_lowercase();
        taken.iter().any(|t| t.to_lowercase() == lower)
    };
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!(" ({n})");
        let stem = truncate_sheet_name(&base, SHEET_NAME_MAX - suffix.chars().count());
        let candidate = format!("{stem}{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn trim_sheet_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\'' || c.is_whitespace())
}

fn truncate_sheet_name(name: &str, max: usize) -> String {
    let truncated: String = name.chars().take(max).collect();
    trim_sheet_name(&truncated).to_string()
}

/// One row of the `Summary` sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub site: String,
    pub heading: String,
    pub subheading: String,
    pub count: usize,
    /// Share of the site total, in percent.
    pub percent_of_site: f64,
}

/// Summary rows in site order, then taxonomy order within each site.
pub fn summary_rows(inventory: &Inventory, taxonomy: &Taxonomy) -> Vec<SummaryRow> {
    let mut rows = Vec::new();
    for site in inventory.sites.keys() {
        let site_total = inventory.site_total(site);
        for (class, bucket) in inventory.ordered_buckets(site, taxonomy) {
            rows.push(SummaryRow {
                site: site.clone(),
                heading: class.heading.clone(),
                subheading: class.subheading.clone(),
                count: bucket.count,
                percent_of_site: percentage(bucket.count, site_total),
            });
        }
    }
    rows
}

fn write_header(sheet: &mut Worksheet, row: u32, headers: &[(&str, f64)], bold: &Format) -> Result<(), XlsxError> {
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(row, col, *title, bold)?;
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

/// Builds the workbook in memory and returns the `.xlsx` bytes.
pub fn render_xlsx(inventory: &Inventory, taxonomy: &Taxonomy, date: NaiveDate) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14);

    let total = inventory.total();
    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    summary.write_string_with_format(0, 0, INVENTORY_TITLE, &title)?;
    summary.write_string(1, 0, generated_on(date))?;
    write_header(
        summary,
        3,
        &[
            ("Site", 28.0),
            ("Heading", 14.0),
            ("Subheading", 22.0),
            ("Count", 8.0),
            ("% of site", 10.0),
        ],
        &bold,
    )?;

    let mut row = 4;
    for entry in summary_rows(inventory, taxonomy) {
        summary.write_string(row, 0, &entry.site)?;
        summary.write_string(row, 1, &entry.heading)?;
        summary.write_string(row, 2, &entry.subheading)?;
        summary.write_number(row, 3, entry.count as f64)?;
        summary.write_number(row, 4, entry.percent_of_site)?;
        row += 1;
    }
    row += 1;
    summary.write_string_with_format(row, 0, "Total", &bold)?;
    summary.write_number_with_format(row, 3, total as f64, &bold)?;

    let mut taken = vec![SUMMARY_SHEET.to_string()];
    for site in inventory.sites.keys() {
        let name = sheet_name(site, &taken);
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        taken.push(name);

        sheet.write_string_with_format(0, 0, site, &title)?;
        write_header(sheet, 2, ITEM_HEADERS, &bold)?;

        let mut row = 3;
        for (class, bucket) in inventory.ordered_buckets(site, taxonomy) {
            for item in bucket.sorted_items() {
                sheet.write_string(row, 0, &class.heading)?;
                sheet.write_string(row, 1, &class.subheading)?;
                for (offset, cell) in item_row(item).iter().enumerate() {
                    let cell = if offset >= 4 && !cell.is_empty() { TICK } else { cell.as_str() };
                    sheet.write_string(row, 2 + offset as u16, cell)?;
                }
                row += 1;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    info!(sheets = taken.len(), bytes = bytes.len(), "Rendered XLSX workbook");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitised_truncated_and_unique() {
        assert_eq!(sheet_name("AMS1/Rack:3", &[]), "AMS1_Rack_3");
        let long = "A very long datacenter site name exceeding limits";
        let first = sheet_name(long, &[]);
        assert_eq!(first.chars().count(), 31);
        let second = sheet_name(long, &[first.clone()]);
        assert!(second.ends_with(" (2)"));
        assert_eq!(second.chars().count(), 31);
        assert_eq!(sheet_name("summary", &["Summary".to_string()]), "summary (2)");
        assert_eq!(sheet_name("''", &[]), "Site");
    }

    #[test]
    fn sheet_names_never_start_or_end_with_apostrophe() {
        assert_eq!(sheet_name(" 'Quote' ", &[]), "Quote");

        let site = format!("{}'tail", "A".repeat(30));
        let name = sheet_name(&site, &[]);
        assert_eq!(name, "A".repeat(30));

        let suffixed = sheet_name(&site, &[name]);
        assert!(!suffixed.contains('\''), "got {suffixed}");
        assert!(suffixed.ends_with(" (2)"));
    }

    #[test]
    fn sheet_names_compare_unicode_case_insensitively() {
        let first = sheet_name("Äsite", &[]);
        let second = sheet_name("äsite", &[first.clone()]);
        assert_eq!(second, "äsite (2)");
    }

    #[test]
    fn awkward_site_names_render_a_workbook() {
        use crate::aggregate::Inventory;
        use crate::model::{CustomFieldKeys, Item, NbDevice};

        let keys = CustomFieldKeys::default();
        let sites = [
            " 'Quote' ".to_string(),
            format!("{}'tail", "A".repeat(30)),
            "Äsite".to_string(),
            "äsite".to_string(),
        ];
        let items: Vec<Item> = sites
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let device: NbDevice = serde_json::from_value(serde_json::json!({
                    "id": i,
                    "name": format!("dev-{i}"),
                    "site": {"id": i, "name": site},
                    "role": 1,
                    "status": "active"
                }))
                .unwrap();
                Item::from_device(device, &keys)
            })
            .collect();

        let taxonomy = Taxonomy::builtin();
        let inventory = Inventory::accumulate(items, &taxonomy);
        assert_eq!(inventory.sites.len(), 4);

        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let bytes = render_xlsx(&inventory, &taxonomy, date).expect("every site gets a valid sheet");
        assert_eq!(&bytes[0..2], b"PK");
    }
}
