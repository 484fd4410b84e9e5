use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// Returns the 1-based `page` of `items`. Pages before the first or past the
/// last are empty.
pub fn paginate<T>(page: i64, page_size: usize, items: &[T]) -> &[T] {
    let Some(index) = page
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
    else {
        return &[];
    };
    let start = index.saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(items.len());
    items.get(start..end).unwrap_or(&[])
}

/// The `?page=N` query parameter, defaulting to 1.
///
/// When `page` is repeated the first value wins. Integers too large for `i64`
/// saturate, so they still land past the last page. Anything that is not an
/// integer falls back to the first page. Extraction never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(pub i64);

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Page {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => pairs,
            Err(rejection) => {
                tracing::debug!(%rejection, "Unreadable query string, using first page");
                return Ok(Page::default());
            }
        };
        Ok(pairs
            .iter()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| parse_page(value))
            .unwrap_or_default())
    }
}

fn parse_page(raw: &str) -> Page {
    let raw = raw.trim();
    if let Ok(page) = raw.parse() {
        return Page(page);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Page::default();
    }
    if negative {
        Page(i64::MIN)
    } else {
        Page(i64::MAX)
    }
}
