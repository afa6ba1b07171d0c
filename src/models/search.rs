use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Search filters, kept in sync with the page's query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CarSearchQuery {
    pub fn normalized(mut self) -> Self {
        self.keyword = non_blank(self.keyword);
        self.province = non_blank(self.province);
        self.transmission = non_blank(self.transmission);
        self.fuel_type = non_blank(self.fuel_type);

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                self.min_price = Some(max);
                self.max_price = Some(min);
            }
        }
        if let (Some(pickup), Some(ret)) = (self.pickup_date, self.return_date) {
            if ret < pickup {
                self.return_date = None;
            }
        }

        self.page_number = Some(self.page_number.unwrap_or(1).max(1));
        self.page_size = Some(self.page_size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalized_defaults_paging() {
        let q = CarSearchQuery::default().normalized();
        assert_eq!(q.page_number, Some(1));
        assert_eq!(q.page_size, Some(10));
    }

    #[test]
    fn test_normalized_swaps_price_range_and_trims() {
        let q = CarSearchQuery {
            keyword: Some("  vinfast ".to_string()),
            province: Some(" ".to_string()),
            min_price: Some(900_000),
            max_price: Some(300_000),
            page_size: Some(1000),
            ..Default::default()
        }
        .normalized();
        assert_eq!(q.keyword.as_deref(), Some("vinfast"));
        assert_eq!(q.province, None);
        assert_eq!(q.min_price, Some(300_000));
        assert_eq!(q.max_price, Some(900_000));
        assert_eq!(q.page_size, Some(50));
    }

    #[test]
    fn test_normalized_drops_return_before_pickup() {
        let q = CarSearchQuery {
            pickup_date: Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()),
            return_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
        .normalized();
        assert!(q.pickup_date.is_some());
        assert!(q.return_date.is_none());
    }
}
