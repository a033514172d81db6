//! End-to-end orchestration of one search request.

use crate::{
    bounds::resolve_bounds,
    config::SearchConfig,
    cursor::CursorCodec,
    error::SearchError,
    queries::{
        facets::facet_statements,
        listings::{PageMode, cursor_row, listing_statement, map_statement},
    },
    response::{
        FacetResponse, HistogramBucket, ListPayload, ListingItem, MapMode, MapPayload, Pin,
        PriceRangeStats, SearchMeta, SearchResponse, geojson_feature_collection,
    },
};
use chrono::Utc;
use connectors::{row::RowData, store::SearchStore};
use model::{
    pagination::cursor::DecodedCursor,
    search::{filter::SearchFilter, sort::SortMode},
};
use planner::query::keyset::KeysetBound;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

pub struct SearchService {
    store: Arc<dyn SearchStore>,
    config: SearchConfig,
    codec: CursorCodec,
}

impl SearchService {
    pub fn new(store: Arc<dyn SearchStore>, config: SearchConfig) -> Self {
        let codec = CursorCodec::new(config.cursor_secret.as_deref());
        Self {
            store,
            config,
            codec,
        }
    }

    /// Facet counts for the active filter. Validation failures never reach
    /// the datastore; an unbounded, query-less browse short-circuits to the
    /// all-empty response.
    pub async fn facets(&self, filter: &SearchFilter) -> Result<FacetResponse, SearchError> {
        let Some(bounds) = resolve_bounds(filter, &self.config)? else {
            debug!("unbounded browse, returning empty facets without querying");
            return Ok(FacetResponse::empty());
        };

        let statements = facet_statements(filter, &bounds);
        let results = self
            .store
            .query_group(self.config.facet_timeout, &statements)
            .await
            .map_err(|err| {
                warn!("facet query group failed: {err}");
                SearchError::from(err)
            })?;

        Ok(decode_facets(&results))
    }

    /// One search request: bounds resolution, pagination-path decision, the
    /// list and map queries as a unit, and response shaping. `page` is the
    /// legacy page-number parameter, honored only on the offset path.
    pub async fn search(
        &self,
        filter: &SearchFilter,
        sort: SortMode,
        cursor: Option<&str>,
        page: Option<u64>,
    ) -> Result<SearchResponse, SearchError> {
        if !self.config.v2_enabled {
            return Err(SearchError::SearchDisabled);
        }

        let bounds = resolve_bounds(filter, &self.config)?;
        let mode = self.resolve_page_mode(sort, cursor, page);
        debug!(sort = %sort, keyset = mode.is_keyset(), "executing search");

        let list_statement =
            listing_statement(filter, bounds.as_ref(), sort, &mode, self.config.page_size);
        let map_statement = map_statement(filter, bounds.as_ref(), self.config.map_result_cap);

        // List and map data form one response; a failure in either aborts
        // the whole request rather than returning inconsistent halves.
        let list_rows = self.store.query(&list_statement).await.map_err(|err| {
            warn!("list query failed: {err}");
            SearchError::from(err)
        })?;
        let map_rows = self.store.query(&map_statement).await.map_err(|err| {
            warn!("map query failed: {err}");
            SearchError::from(err)
        })?;

        Ok(self.assemble(filter, sort, &mode, list_rows, map_rows))
    }

    /// Picks the pagination path for an incoming cursor. Stale, tampered,
    /// legacy-shaped or sort-incompatible cursors never fail the request;
    /// they degrade to the first page.
    fn resolve_page_mode(
        &self,
        sort: SortMode,
        cursor: Option<&str>,
        page: Option<u64>,
    ) -> PageMode {
        if !self.config.keyset_pagination {
            let page = cursor
                .and_then(|c| self.codec.decode_legacy(c))
                .or(page.filter(|p| *p >= 1))
                .unwrap_or(1);
            return PageMode::Offset { page };
        }

        match cursor.and_then(|c| self.codec.decode_any(c, Some(sort))) {
            Some(DecodedCursor::Keyset(cursor)) => KeysetBound::from_cursor(&cursor)
                .map(PageMode::KeysetAfter)
                .unwrap_or(PageMode::KeysetFirst),
            _ => PageMode::KeysetFirst,
        }
    }

    fn assemble(
        &self,
        filter: &SearchFilter,
        sort: SortMode,
        mode: &PageMode,
        list_rows: Vec<RowData>,
        map_rows: Vec<RowData>,
    ) -> SearchResponse {
        let page_size = self.config.page_size;
        let has_next_page = list_rows.len() > page_size;
        let shown = &list_rows[..list_rows.len().min(page_size)];

        let total = shown
            .first()
            .and_then(|row| row.get_i64("total_count"))
            .unwrap_or(0)
            .max(0) as u64;
        let items: Vec<ListingItem> = shown.iter().map(ListingItem::from_row).collect();

        let next_cursor = if has_next_page {
            match mode {
                PageMode::Offset { page } => Some(self.codec.encode_legacy(page + 1)),
                _ => shown.last().map(|row| {
                    self.codec
                        .encode(&self.codec.cursor_from_row(&cursor_row(row), sort))
                }),
            }
        } else {
            None
        };

        let pins: Vec<Pin> = map_rows.iter().filter_map(Pin::from_row).collect();
        let map_mode = if pins.len() < self.config.pin_mode_threshold {
            MapMode::Pins
        } else {
            MapMode::Geojson
        };
        let geojson = geojson_feature_collection(&pins);

        SearchResponse {
            meta: SearchMeta {
                query_hash: query_hash(filter, sort),
                generated_at: Utc::now(),
                mode: map_mode,
            },
            list: ListPayload {
                items,
                next_cursor,
                total,
                has_next_page,
                page_size,
            },
            map: MapPayload {
                geojson,
                pins: (map_mode == MapMode::Pins).then_some(pins),
            },
        }
    }
}

/// Stable hash of the normalized filter and sort, exposed so clients and
/// caches can tell result sets apart cheaply.
fn query_hash(filter: &SearchFilter, sort: SortMode) -> String {
    let normalized = serde_json::to_vec(&(filter, sort.as_str())).unwrap_or_default();
    format!("{:016x}", xxh3_64(&normalized))
}

fn decode_facets(results: &[Vec<RowData>]) -> FacetResponse {
    let amenities = value_counts(results.first());
    let house_rules = value_counts(results.get(1));
    let room_types = value_counts(results.get(2));

    let price_ranges = results
        .get(3)
        .and_then(|rows| rows.first())
        .map(|row| PriceRangeStats {
            min: row.get_decimal("min"),
            max: row.get_decimal("max"),
            median: row.get_f64("median"),
        })
        .unwrap_or_default();

    let price_histogram = results.get(4).and_then(|rows| {
        if rows.is_empty() {
            None
        } else {
            Some(
                rows.iter()
                    .filter_map(|row| {
                        Some(HistogramBucket {
                            bucket: row.get_i64("bucket")?,
                            count: row.get_i64("count").unwrap_or(0).max(0) as u64,
                        })
                    })
                    .collect(),
            )
        }
    });

    FacetResponse {
        amenities,
        house_rules,
        room_types,
        price_ranges,
        price_histogram,
    }
}

/// Folds `value -> count` rows into a map; bigint counts are clamped into
/// `u64` for JSON transport.
fn value_counts(rows: Option<&Vec<RowData>>) -> BTreeMap<String, u64> {
    rows.map(|rows| {
        rows.iter()
            .filter_map(|row| {
                let value = row.get_string("value")?;
                let count = row.get_i64("count").unwrap_or(0).max(0) as u64;
                Some((value, count))
            })
            .collect()
    })
    .unwrap_or_default()
}
