//! Geographic bounds validation, derivation and clamping.

use crate::{config::SearchConfig, error::SearchError};
use model::search::filter::{BoundingBox, SearchFilter};

/// Kilometers per degree of latitude (and of longitude at the equator).
const KM_PER_DEG: f64 = 111.32;

/// Resolves the effective bounding box for a request.
///
/// Explicit bounds are validated and normalized, then clamped to the
/// configured maximum span (sloppy world-sized boxes succeed rather than
/// fail). Without explicit bounds, a center point derives a fixed-radius
/// box. A text query with neither is rejected before any datastore access:
/// an unbounded full-text scan over the whole table is a denial-of-service
/// vector. `Ok(None)` means an unbounded, query-less browse.
pub fn resolve_bounds(
    filter: &SearchFilter,
    config: &SearchConfig,
) -> Result<Option<BoundingBox>, SearchError> {
    if let Some(bounds) = &filter.bounds {
        if !bounds.is_finite() {
            return Err(SearchError::InvalidBounds(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        let normalized = normalize(bounds);
        return Ok(Some(clamp_span(&normalized, config.max_span_deg)));
    }

    if let Some((lat, lng)) = filter.center {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(SearchError::InvalidBounds(
                "center coordinates must be finite numbers".to_string(),
            ));
        }
        return Ok(Some(from_center(lat, lng, config.default_radius_km)));
    }

    if filter.has_text_query() {
        return Err(SearchError::BoundsRequired);
    }

    Ok(None)
}

/// Swaps inverted edges so `south <= north` and `west <= east`.
fn normalize(bounds: &BoundingBox) -> BoundingBox {
    BoundingBox::new(
        bounds.south.min(bounds.north),
        bounds.west.min(bounds.east),
        bounds.south.max(bounds.north),
        bounds.west.max(bounds.east),
    )
}

/// Shrinks an oversized box around its center instead of rejecting it.
/// Boxes already within the limit are returned untouched.
fn clamp_span(bounds: &BoundingBox, max_span_deg: f64) -> BoundingBox {
    if bounds.lat_span() <= max_span_deg && bounds.lng_span() <= max_span_deg {
        return *bounds;
    }
    let (center_lat, center_lng) = bounds.center();
    let half_lat = (bounds.lat_span() / 2.0).min(max_span_deg / 2.0);
    let half_lng = (bounds.lng_span() / 2.0).min(max_span_deg / 2.0);
    BoundingBox::new(
        center_lat - half_lat,
        center_lng - half_lng,
        center_lat + half_lat,
        center_lng + half_lng,
    )
}

/// Derives a bounding box of roughly `radius_km` around a center point.
/// Longitude degrees shrink with latitude; the cosine is floored away from
/// zero so polar centers still get a usable box.
fn from_center(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let half_lat = radius_km / KM_PER_DEG;
    let half_lng = radius_km / (KM_PER_DEG * lat.to_radians().cos().max(0.01));
    BoundingBox::new(lat - half_lat, lng - half_lng, lat + half_lat, lng + half_lng)
}
