use serde::{Deserialize, Serialize};

/// Province / district / ward triple used for pickup and dropoff points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub ward: String,
}

impl Location {
    pub fn in_province(province: &str) -> Self {
        Self {
            province: province.to_string(),
            ..Self::default()
        }
    }

    pub fn has_region(&self) -> bool {
        !self.province.trim().is_empty()
    }

    pub fn to_display(&self) -> String {
        [&self.ward, &self.district, &self.province]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_province_has_no_region() {
        let loc = Location {
            province: "   ".to_string(),
            district: "District 1".to_string(),
            ward: String::new(),
        };
        assert!(!loc.has_region());
        assert!(Location::in_province("Ha Noi").has_region());
    }

    #[test]
    fn test_to_display_skips_empty_parts() {
        let loc = Location {
            province: "Ho Chi Minh".to_string(),
            district: "District 3".to_string(),
            ward: String::new(),
        };
        assert_eq!(loc.to_display(), "District 3, Ho Chi Minh");
    }
}
