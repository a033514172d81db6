use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Geographic bounding box, degrees. `south <= north` is normalized by the
/// bounds resolver, not assumed here.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.south.is_finite()
            && self.west.is_finite()
            && self.north.is_finite()
            && self.east.is_finite()
    }

    pub fn lat_span(&self) -> f64 {
        (self.north - self.south).abs()
    }

    pub fn lng_span(&self) -> f64 {
        (self.east - self.west).abs()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// All filters active for one search request. Derived once from the raw
/// request parameters and treated as immutable afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub bounds: Option<BoundingBox>,
    /// Fallback center point when no explicit bounds were sent.
    pub center: Option<(f64, f64)>,
    pub query: Option<String>,
    pub price_min: Option<BigDecimal>,
    pub price_max: Option<BigDecimal>,
    pub room_type: Option<String>,
    pub amenities: Vec<String>,
    pub house_rules: Vec<String>,
    pub languages: Vec<String>,
}

impl SearchFilter {
    pub fn has_text_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    pub fn has_price_filter(&self) -> bool {
        self.price_min.is_some() || self.price_max.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_finiteness() {
        assert!(BoundingBox::new(40.0, -74.1, 40.9, -73.7).is_finite());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(!BoundingBox::new(0.0, f64::INFINITY, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_blank_query_is_not_a_text_query() {
        let mut filter = SearchFilter::default();
        assert!(!filter.has_text_query());
        filter.query = Some("   ".into());
        assert!(!filter.has_text_query());
        filter.query = Some("loft".into());
        assert!(filter.has_text_query());
    }
}
