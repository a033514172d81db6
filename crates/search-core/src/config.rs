use std::time::Duration;

/// Process-wide search configuration, read-only after startup and injected
/// at service construction. Feature flags live here rather than in module
/// state so both code paths stay testable without cross-test mutation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Master switch for the v2 search path.
    pub v2_enabled: bool,

    /// When false, every request uses offset pagination and legacy cursors,
    /// regardless of what the client sends.
    pub keyset_pagination: bool,

    /// Enables HMAC-signed cursors. Absent means unsigned mode, a permitted
    /// degraded mode for environments without secret management.
    pub cursor_secret: Option<String>,

    /// Rows per page of list results.
    pub page_size: usize,

    /// Below this many map results the response mode switches to `pins`.
    pub pin_mode_threshold: usize,

    /// Hard cap on rows returned by the map query.
    pub map_result_cap: usize,

    /// Radius of the bounding box derived from a bare center point.
    pub default_radius_km: f64,

    /// Maximum bounding-box span in degrees; larger boxes are clamped.
    pub max_span_deg: f64,

    /// Statement timeout applied to facet aggregate queries.
    pub facet_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            v2_enabled: true,
            keyset_pagination: true,
            cursor_secret: None,
            page_size: 20,
            pin_mode_threshold: 50,
            map_result_cap: 500,
            default_radius_km: 10.0,
            max_span_deg: 4.0,
            facet_timeout: Duration::from_secs(5),
        }
    }
}
