//! Turns aggregates into a format-neutral [`Document`] that the PDF renderer
//! lays out page by page.

use chrono::NaiveDate;

use crate::aggregate::{percentage, Inventory, RoleCounts};
use crate::model::Item;
use crate::taxonomy::Taxonomy;

pub const COUNTS_TITLE: &str = "NetBox Device Count by Site and Role";
pub const INVENTORY_TITLE: &str = "NetBox Inventory by Site and Role";

/// Rendered in place of a ticked boolean column; blank otherwise.
pub const TICK: &str = "X";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    /// Share of the usable page width, in percent.
    pub width: f32,
}

impl Column {
    fn new(header: &str, width: f32) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Strong(String),
    Bullets(Vec<String>),
    Table {
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    },
    /// Vertical gap in points.
    Spacer(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

pub fn generated_on(date: NaiveDate) -> String {
    format!("Generated on: {}", date.format("%B %d, %Y"))
}

pub fn format_percentage(part: usize, whole: usize) -> String {
    format!("{:.1}%", percentage(part, whole))
}

fn tick(flag: bool) -> String {
    let mark = if flag { TICK } else { "" };
    mark.to_string()
}

/// Site → role-name device counts with a grand total.
pub fn counts_document(counts: &RoleCounts, date: NaiveDate) -> Document {
    let mut blocks = vec![
        Block::Title(COUNTS_TITLE.to_string()),
        Block::Spacer(24.0),
        Block::Paragraph(generated_on(date)),
        Block::Spacer(24.0),
    ];

    for (site, roles) in &counts.sites {
        blocks.push(Block::Heading(format!("Site: {site}")));
        blocks.push(Block::Bullets(
            roles
                .iter()
                .map(|(role, count)| format!("{role}: {count}"))
                .collect(),
        ));
        blocks.push(Block::Spacer(12.0));
    }

    blocks.push(Block::Spacer(24.0));
    blocks.push(Block::Strong(format!(
        "Total Devices in All Sites: {}",
        counts.total()
    )));

    Document {
        title: COUNTS_TITLE.to_string(),
        blocks,
    }
}

fn item_columns() -> Vec<Column> {
    vec![
        Column::new("Name", 22.0),
        Column::new("Kind", 8.0),
        Column::new("Description", 28.0),
        Column::new("Serial", 15.0),
        Column::new("Primary IP", 9.0),
        Column::new("Backup", 9.0),
        Column::new("Monitoring", 9.0),
    ]
}

pub fn item_row(item: &Item) -> Vec<String> {
    vec![
        item.name.clone(),
        item.kind.label().to_string(),
        item.description.clone(),
        item.serial.clone(),
        tick(item.has_primary_ip),
        tick(item.backup),
        tick(item.monitored),
    ]
}

/// Classified inventory: overall heading summary, then per site each
/// heading/subheading with its share of the site and an item table.
pub fn inventory_document(inventory: &Inventory, taxonomy: &Taxonomy, date: NaiveDate) -> Document {
    let total = inventory.total();
    let mut blocks = vec![
        Block::Title(INVENTORY_TITLE.to_string()),
        Block::Spacer(12.0),
        Block::Paragraph(generated_on(date)),
        Block::Spacer(12.0),
        Block::Heading("Summary".to_string()),
        Block::Table {
            columns: vec![
                Column::new("Heading", 50.0),
                Column::new("Count", 25.0),
                Column::new("% of total", 25.0),
            ],
            rows: inventory
                .heading_totals(taxonomy)
                .into_iter()
                .map(|(heading, count)| {
                    vec![heading, count.to_string(), format_percentage(count, total)]
                })
                .collect(),
        },
        Block::Strong(format!("Total active items in all sites: {total}")),
        Block::Spacer(18.0),
    ];

    for site in inventory.sites.keys() {
        let site_total = inventory.site_total(site);
        blocks.push(Block::Heading(format!("Site: {site} ({site_total})")));

        let mut current_heading: Option<&str> = None;
        for (class, bucket) in inventory.ordered_buckets(site, taxonomy) {
            if current_heading != Some(class.heading.as_str()) {
                blocks.push(Block::Subheading(class.heading.clone()));
                current_heading = Some(class.heading.as_str());
            }
            blocks.push(Block::Strong(format!(
                "{}: {} ({} of site)",
                class.subheading,
                bucket.count,
                format_percentage(bucket.count, site_total)
            )));
            blocks.push(Block::Table {
                columns: item_columns(),
                rows: bucket.sorted_items().into_iter().map(item_row).collect(),
            });
            blocks.push(Block::Spacer(6.0));
        }
        blocks.push(Block::Spacer(12.0));
    }

    Document {
        title: INVENTORY_TITLE.to_string(),
        blocks,
    }
}
