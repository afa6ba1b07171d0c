use serde::{Deserialize, Serialize};

/// The `{status, message, data}` wrapper every rental API response uses.
/// Paginated endpoints add a sibling `pagination` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<EnvelopeStatus>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeStatus {
    Code(u16),
    Text(String),
}

impl EnvelopeStatus {
    pub fn is_success(&self) -> bool {
        match self {
            EnvelopeStatus::Code(code) => (200..300).contains(code),
            EnvelopeStatus::Text(text) => {
                matches!(text.to_lowercase().as_str(), "success" | "ok" | "200" | "201")
            }
        }
    }
}

impl<T> Envelope<T> {
    /// A missing status is treated as success; the HTTP status already
    /// said so.
    pub fn is_success(&self) -> bool {
        self.status.as_ref().map(|s| s.is_success()).unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(alias = "totalCount")]
    pub total_records: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
}

impl Pagination {
    pub fn single_page(len: usize) -> Self {
        Self {
            page_number: 1,
            page_size: len as u32,
            total_records: len as u64,
            total_pages: 1,
            has_previous_page: false,
            has_next_page: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
