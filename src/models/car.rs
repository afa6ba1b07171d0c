use serde::{Deserialize, Serialize};

use super::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub seats: Option<u8>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    /// Daily rate. Some listings omit it until the owner sets a price.
    #[serde(default)]
    pub base_price: Option<i64>,
    #[serde(default)]
    pub deposit: Option<i64>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub base_price: Option<i64>,
    #[serde(default)]
    pub seats: Option<u8>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub thumbnail: Option<String>,
}
