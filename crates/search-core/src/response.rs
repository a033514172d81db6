//! Wire-facing response types handed to the HTTP layer.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use connectors::row::RowData;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Which map payload the client should prefer. The GeoJSON collection is
/// present either way; `pins` only adds the lightweight list when the
/// result set is small.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    Pins,
    Geojson,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub query_hash: String,
    pub generated_at: DateTime<Utc>,
    pub mode: MapMode,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<BigDecimal>,
    pub room_type: Option<String>,
    pub avg_rating: Option<BigDecimal>,
    pub review_count: Option<i64>,
    pub recommended_score: Option<BigDecimal>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub listing_created_at: Option<DateTime<Utc>>,
}

impl ListingItem {
    pub fn from_row(row: &RowData) -> Self {
        Self {
            id: row.get_string("id").unwrap_or_default(),
            title: row.get_string("title"),
            price: row.get_decimal("price"),
            room_type: row.get_string("room_type"),
            avg_rating: row.get_decimal("avg_rating"),
            review_count: row.get_i64("review_count"),
            recommended_score: row.get_decimal("recommended_score"),
            lat: row.get_f64("lat"),
            lng: row.get_f64("lng"),
            listing_created_at: row.get_timestamp("listing_created_at"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListPayload {
    pub items: Vec<ListingItem>,
    pub next_cursor: Option<String>,
    pub total: u64,
    pub has_next_page: bool,
    pub page_size: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub price: Option<BigDecimal>,
}

impl Pin {
    pub fn from_row(row: &RowData) -> Option<Self> {
        Some(Self {
            id: row.get_string("id")?,
            lat: row.get_f64("lat")?,
            lng: row.get_f64("lng")?,
            price: row.get_decimal("price"),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MapPayload {
    pub geojson: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pins: Option<Vec<Pin>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub meta: SearchMeta,
    pub list: ListPayload,
    pub map: MapPayload,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeStats {
    pub min: Option<BigDecimal>,
    pub max: Option<BigDecimal>,
    pub median: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    pub bucket: i64,
    pub count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FacetResponse {
    pub amenities: BTreeMap<String, u64>,
    pub house_rules: BTreeMap<String, u64>,
    pub room_types: BTreeMap<String, u64>,
    pub price_ranges: PriceRangeStats,
    pub price_histogram: Option<Vec<HistogramBucket>>,
}

impl FacetResponse {
    /// The all-empty response returned when querying would be unsafe or
    /// meaningless (unbounded, query-less browse).
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Builds the always-present GeoJSON FeatureCollection from the pin rows.
pub fn geojson_feature_collection(pins: &[Pin]) -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": pins
            .iter()
            .map(|pin| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [pin.lng, pin.lat],
                    },
                    "properties": {
                        "id": pin.id,
                        "price": pin.price,
                    },
                })
            })
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_feature_collection_shape() {
        let pins = vec![Pin {
            id: "listing-1".to_string(),
            lat: 40.7,
            lng: -74.0,
            price: Some(BigDecimal::from_str("120.50").unwrap()),
        }];
        let geojson = geojson_feature_collection(&pins);
        assert_eq!(geojson["type"], "FeatureCollection");
        let feature = &geojson["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], -74.0);
        assert_eq!(feature["geometry"]["coordinates"][1], 40.7);
        assert_eq!(feature["properties"]["id"], "listing-1");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let payload = ListPayload {
            items: vec![],
            next_cursor: None,
            total: 0,
            has_next_page: false,
            page_size: 20,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("nextCursor").is_some());
        assert!(json.get("hasNextPage").is_some());
        assert!(json.get("pageSize").is_some());
    }

    #[test]
    fn test_pins_omitted_when_absent() {
        let map = MapPayload {
            geojson: json!({"type": "FeatureCollection", "features": []}),
            pins: None,
        };
        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("pins").is_none());
    }
}
