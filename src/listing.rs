// Listing record as returned by the Garage backend, plus derived display values

use serde::{Deserialize, Serialize};

/// Sentinel for a city or state that was never filled in.
pub const NOT_PROVIDED: &str = "NA";

/// Sentinel for a missing zip code.
pub const NO_ZIP: &str = "00000";

/// A for-sale item. Read-only input to the invoice builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: String,
    pub listing_title: String,
    #[serde(default)]
    pub listing_description: String,
    #[serde(default)]
    pub item_brand: String,
    pub selling_price: f64,
    /// Pounds. `None` (or zero) renders as "unknown".
    #[serde(default)]
    pub item_weight: Option<f64>,
    #[serde(default)]
    pub is_shippable: bool,
    #[serde(default)]
    pub address_primary: String,
    #[serde(default)]
    pub address_city: String,
    #[serde(default)]
    pub address_state: String,
    #[serde(default)]
    pub address_zip: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl ListingRecord {
    /// Full address for the detail table: primary, city, state, zip joined
    /// with ", ", skipping sentinels and blank parts.
    pub fn compose_location(&self) -> String {
        let city = if self.address_city != NOT_PROVIDED { self.address_city.trim() } else { "" };
        let state = if self.address_state != NOT_PROVIDED { self.address_state.trim() } else { "" };
        let zip = if self.address_zip != NO_ZIP { self.address_zip.trim() } else { "" };

        [self.address_primary.trim(), city, state, zip]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Short "City State Zip" line used by the review summary.
    pub fn review_location(&self) -> String {
        let city_given = self.address_city != NOT_PROVIDED;
        let mut out = String::new();
        if city_given {
            out.push_str(&self.address_city);
        }
        out.push(' ');
        if self.address_state != NOT_PROVIDED {
            out.push_str(&self.address_state);
        }
        if self.address_zip != NO_ZIP && (city_given || !self.address_state.is_empty()) {
            out.push(' ');
            out.push_str(&self.address_zip);
        }
        out.trim().to_string()
    }

    pub fn weight_display(&self) -> String {
        match self.item_weight {
            Some(weight) if weight != 0.0 && !weight.is_nan() => format!("{} lbs", weight),
            _ => "unknown".to_string(),
        }
    }

    pub fn shippable_display(&self) -> &'static str {
        if self.is_shippable {
            "Yes"
        } else {
            "No"
        }
    }

    /// Raw price as shown in the review summary (`$1500`, `$12.5`).
    pub fn review_price(&self) -> String {
        format!("${}", self.selling_price)
    }
}

#[cfg(test)]
pub(crate) fn fixture() -> ListingRecord {
    ListingRecord {
        id: "2f9e4d2a-1b3c-4d5e-8f70-112233445566".to_string(),
        listing_title: "2004 Pierce Dash Pumper".to_string(),
        listing_description: "1500 GPM pump, 750 gallon tank, low miles.".to_string(),
        item_brand: "Pierce".to_string(),
        selling_price: 45000.0,
        item_weight: Some(38000.0),
        is_shippable: false,
        address_primary: "12 Station Rd".to_string(),
        address_city: "Fresno".to_string(),
        address_state: "CA".to_string(),
        address_zip: "93701".to_string(),
        image_urls: Vec::new(),
    }
}
