//! Cursor-based pagination parameters.
//!
//! List endpoints return at most `limit` items per page and report the
//! cursors of adjacent pages in the `CB-BEFORE` / `CB-AFTER` response
//! headers. Feed those back through [`PaginationParams::advance`] and
//! request the next page with [`PaginationParams::encode`].

use std::collections::BTreeMap;

use bon::Builder;
use url::form_urlencoded;

use crate::types::ResponseMeta;

/// Which neighbouring page to request.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Older items, selected with the `after` cursor.
    #[default]
    Next,
    /// Newer items, selected with the `before` cursor.
    Prev,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct PaginationParams {
    /// Page size; omitted from the query when unset or zero.
    pub limit: Option<u32>,
    #[builder(default, into)]
    pub before: String,
    #[builder(default, into)]
    pub after: String,
    /// Additional query parameters sent with every page.
    #[builder(default)]
    pub extra: BTreeMap<String, String>,
}

impl PaginationParams {
    /// Encodes the query string for one page fetch in `direction`.
    ///
    /// Parameters appear as `limit`, then the cursor, then extras in key
    /// order.
    #[must_use]
    pub fn encode(&self, direction: Direction) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());

        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            query.append_pair("limit", &limit.to_string());
        }
        match direction {
            Direction::Prev if !self.before.is_empty() => {
                query.append_pair("before", &self.before);
            }
            Direction::Next if !self.after.is_empty() => {
                query.append_pair("after", &self.after);
            }
            _ => {}
        }
        query.extend_pairs(&self.extra);

        query.finish()
    }

    /// `true` once neither cursor points anywhere.
    #[must_use]
    pub fn done(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Sets an extra query parameter, replacing any previous value for `key`.
    pub fn add_extra_param<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.extra.insert(key.into(), value.into());
    }

    /// Takes the cursors reported by a page response. A missing header clears
    /// the corresponding cursor.
    pub fn advance(&mut self, meta: &ResponseMeta) {
        meta.before().unwrap_or_default().clone_into(&mut self.before);
        meta.after().unwrap_or_default().clone_into(&mut self.after);
    }

    /// The cursor that [`encode`](Self::encode) would send for `direction`.
    #[must_use]
    pub fn cursor(&self, direction: Direction) -> &str {
        match direction {
            Direction::Next => &self.after,
            Direction::Prev => &self.before,
        }
    }
}
