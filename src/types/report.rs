//! Reporting Types
//!
//! Core reporting and management API payloads.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::envelope::StatusCoded;

/// Error object returned by the reporting and management APIs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

/// Column description in a report.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub name: String,
    /// `DIMENSION` or `METRIC`.
    #[serde(default)]
    pub column_type: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
}

/// Reporting endpoint response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(rename = "http_code")]
    pub http_code: u16,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Echo of the submitted query.
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub items_per_page: Option<u64>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub column_headers: Vec<ColumnHeader>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub totals_for_all_results: HashMap<String, String>,
    #[serde(default)]
    pub contains_sampled_data: Option<bool>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ReportResponse {
    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_headers.iter().position(|h| h.name == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(index).map(String::as_str))
                .collect(),
        )
    }
}

impl StatusCoded for ReportResponse {
    fn http_code(&self) -> u16 {
        self.http_code
    }
}

/// Web property or profile from the management API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementEntity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub web_property_id: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ManagementEntity {
    /// Report identifier (`ga:<id>`) for a profile.
    pub fn report_id(&self) -> String {
        format!("ga:{}", self.id)
    }
}

/// Management API list response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementList {
    #[serde(rename = "http_code")]
    pub http_code: u16,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub items: Vec<ManagementEntity>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl StatusCoded for ManagementList {
    fn http_code(&self) -> u16 {
        self.http_code
    }
}
