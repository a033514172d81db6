use crate::{
    core::value::Value,
    search::sort::{KeyKind, SortMode},
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current keyset cursor format version. Bumped on any change to the payload
/// shape; decoders reject everything else.
pub const CURSOR_VERSION: u8 = 1;

/// The keyset resume point: where in the sorted result set the previous page
/// ended. Key values travel as strings so exact decimals never transit
/// through floating point. Never mutated once encoded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeysetCursor {
    /// Format version.
    pub v: u8,

    /// Sort mode this cursor belongs to.
    pub s: SortMode,

    /// Sort-key values of the last row, in `SortMode::key_columns` order.
    /// `None` entries mean the column was NULL and must stay NULL.
    pub k: Vec<Option<String>>,

    /// Tie-breaking row id of the last row.
    pub id: String,
}

impl KeysetCursor {
    pub fn new(s: SortMode, k: Vec<Option<String>>, id: String) -> Self {
        Self {
            v: CURSOR_VERSION,
            s,
            k,
            id,
        }
    }

    /// Structural validity: right version, key count matching the declared
    /// sort, non-empty id. A cursor failing this is treated as absent.
    pub fn is_well_formed(&self) -> bool {
        self.v == CURSOR_VERSION && self.k.len() == self.s.key_count() && !self.id.is_empty()
    }
}

/// The subset of a result row needed to build the next cursor. Nulls are
/// preserved, never defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorRowData {
    pub id: String,
    pub listing_created_at: Option<DateTime<Utc>>,
    pub recommended_score: Option<BigDecimal>,
    pub price: Option<BigDecimal>,
    pub avg_rating: Option<BigDecimal>,
    pub review_count: Option<i64>,
}

/// Outcome of decoding an arbitrary client-supplied cursor string.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedCursor {
    Keyset(KeysetCursor),
    Legacy(u64),
}

/// Parses one cursor key string back into its typed value. Returns `None`
/// when the string does not parse as the declared kind, which invalidates
/// the whole cursor upstream.
pub fn parse_key_value(kind: KeyKind, raw: &str) -> Option<Value> {
    match kind {
        KeyKind::Decimal => raw.parse::<BigDecimal>().ok().map(Value::Decimal),
        KeyKind::Int => raw.parse::<i64>().ok().map(Value::Int),
        KeyKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| Value::Timestamp(t.with_timezone(&Utc))),
    }
}
