use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The five supported result orderings. Wire names are the lowercase
/// snake_case forms (`recommended`, `newest`, `price_asc`, `price_desc`,
/// `rating`), which is also how a cursor records the sort it belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Recommended,
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// Direction of a keyset sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDir {
    Asc,
    Desc,
}

/// How a cursor key value parses back from its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Decimal,
    Int,
    Timestamp,
}

/// One keyset sort column. Every mode's column list is terminated by the
/// implicit `id ASC` tie-break, which is carried on the cursor separately
/// and is not part of this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub dir: KeyDir,
    pub kind: KeyKind,
}

const fn key(column: &'static str, dir: KeyDir, kind: KeyKind) -> SortKey {
    SortKey { column, dir, kind }
}

const RECOMMENDED_KEYS: &[SortKey] = &[
    key("recommended_score", KeyDir::Desc, KeyKind::Decimal),
    key("listing_created_at", KeyDir::Desc, KeyKind::Timestamp),
];

const NEWEST_KEYS: &[SortKey] = &[key("listing_created_at", KeyDir::Desc, KeyKind::Timestamp)];

const PRICE_ASC_KEYS: &[SortKey] = &[
    key("price", KeyDir::Asc, KeyKind::Decimal),
    key("listing_created_at", KeyDir::Desc, KeyKind::Timestamp),
];

const PRICE_DESC_KEYS: &[SortKey] = &[
    key("price", KeyDir::Desc, KeyKind::Decimal),
    key("listing_created_at", KeyDir::Desc, KeyKind::Timestamp),
];

const RATING_KEYS: &[SortKey] = &[
    key("avg_rating", KeyDir::Desc, KeyKind::Decimal),
    key("review_count", KeyDir::Desc, KeyKind::Int),
    key("listing_created_at", KeyDir::Desc, KeyKind::Timestamp),
];

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recommended => "recommended",
            SortMode::Newest => "newest",
            SortMode::PriceAsc => "price_asc",
            SortMode::PriceDesc => "price_desc",
            SortMode::Rating => "rating",
        }
    }

    /// The ordered keyset columns for this mode, excluding the `id` tie-break.
    pub fn key_columns(&self) -> &'static [SortKey] {
        match self {
            SortMode::Recommended => RECOMMENDED_KEYS,
            SortMode::Newest => NEWEST_KEYS,
            SortMode::PriceAsc => PRICE_ASC_KEYS,
            SortMode::PriceDesc => PRICE_DESC_KEYS,
            SortMode::Rating => RATING_KEYS,
        }
    }

    /// Expected length of a cursor's `k` array for this mode.
    pub fn key_count(&self) -> usize {
        self.key_columns().len()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(SortMode::Recommended),
            "newest" => Ok(SortMode::Newest),
            "price_asc" => Ok(SortMode::PriceAsc),
            "price_desc" => Ok(SortMode::PriceDesc),
            "rating" => Ok(SortMode::Rating),
            _ => Err(()),
        }
    }
}
