#![doc = "netbox-report-core: core logic library for netbox-report."]

//! This crate contains the data models and pipeline behind the `netbox-report`
//! CLI: paginated NetBox fetches, role classification, aggregation, and PDF or
//! spreadsheet rendering.
//!
//! # Usage
//! Build a [`config::ReportConfig`], pass it with a [`contract::PageFetcher`]
//! (normally [`fetch::NetBoxClient`]) to one of the functions in [`report`].

pub mod aggregate;
pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod model;
pub mod render;
pub mod report;
pub mod taxonomy;
