//! Opaque pagination cursor encoding.
//!
//! A cursor is client-supplied input and must never be trusted: with a
//! secret configured, payloads are HMAC-SHA256 signed and any mutation of
//! the token decodes to `None`. Decoding never errors — every malformed,
//! tampered or incompatible token degrades to "no cursor", which callers
//! turn into a first-page query.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::SecondsFormat;
use hmac::{Hmac, Mac};
use model::{
    pagination::cursor::{CursorRowData, DecodedCursor, KeysetCursor},
    search::sort::SortMode,
};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Envelope wrapping a signed payload: `p` carries the base64url payload
/// JSON, `m` its base64url MAC.
#[derive(Serialize, Deserialize)]
struct SignedEnvelope {
    p: String,
    m: String,
}

/// Legacy offset token, `{ "p": page }`. Must never contain a `v` key; that
/// is what distinguishes it from a keyset payload.
#[derive(Serialize)]
struct LegacyToken {
    p: u64,
}

pub struct CursorCodec {
    secret: Option<Vec<u8>>,
}

impl CursorCodec {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.secret.is_some()
    }

    /// Serializes a cursor to its URL-safe transport form.
    pub fn encode(&self, cursor: &KeysetCursor) -> String {
        let payload = serde_json::to_vec(cursor).unwrap();
        match &self.secret {
            Some(secret) => {
                let mut mac =
                    HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
                mac.update(&payload);
                let envelope = SignedEnvelope {
                    p: URL_SAFE_NO_PAD.encode(&payload),
                    m: URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()),
                };
                URL_SAFE_NO_PAD.encode(serde_json::to_vec(&envelope).unwrap())
            }
            None => URL_SAFE_NO_PAD.encode(&payload),
        }
    }

    /// Decodes and validates a keyset cursor. Returns `None` for malformed
    /// base64 or JSON, a missing or wrong MAC, an unsigned token in signed
    /// mode, a wrong version, an unknown sort, an empty id, a key-count
    /// mismatch, or a sort differing from `expected`.
    pub fn decode(&self, raw: &str, expected: Option<SortMode>) -> Option<KeysetCursor> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;

        let payload = match &self.secret {
            Some(secret) => {
                let envelope: SignedEnvelope = serde_json::from_slice(&bytes).ok()?;
                let payload = URL_SAFE_NO_PAD.decode(envelope.p).ok()?;
                let claimed_mac = URL_SAFE_NO_PAD.decode(envelope.m).ok()?;
                let mut mac =
                    HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
                mac.update(&payload);
                // Constant-time comparison.
                mac.verify_slice(&claimed_mac).ok()?;
                payload
            }
            None => bytes,
        };

        let cursor: KeysetCursor = serde_json::from_slice(&payload).ok()?;
        if !cursor.is_well_formed() {
            return None;
        }
        if let Some(expected) = expected
            && cursor.s != expected
        {
            return None;
        }
        Some(cursor)
    }

    /// Decodes a legacy offset token. Rejects pages below 1, non-integral
    /// pages, and anything carrying a `v` key (a keyset payload).
    pub fn decode_legacy(&self, raw: &str) -> Option<u64> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;
        let json: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let obj = json.as_object()?;
        if obj.contains_key("v") {
            return None;
        }
        let page = obj.get("p")?.as_u64()?;
        if page == 0 {
            return None;
        }
        Some(page)
    }

    /// Serializes a legacy offset token, used while keyset pagination is
    /// switched off.
    pub fn encode_legacy(&self, page: u64) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&LegacyToken { p: page }).unwrap())
    }

    /// Tries keyset first, then legacy. Keyset takes precedence so a live
    /// keyset token can never be hijacked by the legacy path; the two
    /// formats are disambiguated by the `v` key in any case.
    pub fn decode_any(&self, raw: &str, expected: Option<SortMode>) -> Option<DecodedCursor> {
        if let Some(cursor) = self.decode(raw, expected) {
            return Some(DecodedCursor::Keyset(cursor));
        }
        self.decode_legacy(raw).map(DecodedCursor::Legacy)
    }

    /// Projects the sort-specific fields of the last row of a page into the
    /// next cursor. NULL columns stay `None`; decimals keep their exact
    /// textual form.
    pub fn cursor_from_row(&self, row: &CursorRowData, sort: SortMode) -> KeysetCursor {
        let k = sort
            .key_columns()
            .iter()
            .map(|key| match key.column {
                "recommended_score" => row.recommended_score.as_ref().map(|v| v.to_string()),
                "price" => row.price.as_ref().map(|v| v.to_string()),
                "avg_rating" => row.avg_rating.as_ref().map(|v| v.to_string()),
                "review_count" => row.review_count.map(|v| v.to_string()),
                "listing_created_at" => row
                    .listing_created_at
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true)),
                other => unreachable!("unmapped sort key column {other}"),
            })
            .collect();

        KeysetCursor::new(sort, k, row.id.clone())
    }
}
