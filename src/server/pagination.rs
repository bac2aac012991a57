
//! Limit/offset pagination for collection endpoints.

use super::config::ApiConfig;
use crate::store::{Page, PageRequest};

use rocket::FromForm;
use rocket::http::uri::Origin;
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// Query string of collections that support nothing but paging.
#[derive(Debug, Clone, Default, FromForm, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
  /// Page size.
  #[param(value_type = Option<i64>)]
  pub limit: Option<String>,
  /// Index of the first result.
  #[param(value_type = Option<i64>)]
  pub offset: Option<String>,
}

/// A page of results as sent over the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
  /// Size of the whole filtered collection.
  pub count: i64,
  /// Link to the following page, if any.
  pub next: Option<String>,
  /// Link to the preceding page, if any.
  pub previous: Option<String>,
  pub results: Vec<T>,
}

/// Reads the requested window. A missing, non-numeric or
/// non-positive `limit` falls back to the configured page size, and
/// any `limit` is capped at the configured maximum. Invalid offsets
/// count as zero.
pub fn page_request(limit: Option<&str>, offset: Option<&str>, config: &ApiConfig) -> PageRequest {
  let limit = limit
    .and_then(|limit| limit.trim().parse::<i64>().ok())
    .filter(|limit| *limit > 0)
    .unwrap_or(config.page_size)
    .min(config.max_page_size);
  let offset = offset
    .and_then(|offset| offset.trim().parse::<i64>().ok())
    .filter(|offset| *offset > 0)
    .unwrap_or(0);
  PageRequest { limit, offset }
}

impl PageQuery {
  pub fn page_request(&self, config: &ApiConfig) -> PageRequest {
    page_request(self.limit.as_deref(), self.offset.as_deref(), config)
  }
}

/// Wraps a page from the store, linking its neighbours. The links
/// repeat every query parameter of the current request apart from
/// `limit` and `offset`.
pub fn paginate<T>(page: Page<T>, request: PageRequest, collection_url: &str, uri: &Origin<'_>) -> Paginated<T> {
  let query = uri.query().map(|query| query.as_str()).unwrap_or("");
  let next_offset = request.offset.saturating_add(request.limit);
  let next = (next_offset < page.count).then(|| {
    page_link(collection_url, query, request.limit, next_offset)
  });
  let previous = (request.offset > 0).then(|| {
    page_link(collection_url, query, request.limit, (request.offset - request.limit).max(0))
  });
  Paginated {
    count: page.count,
    next,
    previous,
    results: page.items,
  }
}

fn page_link(collection_url: &str, query: &str, limit: i64, offset: i64) -> String {
  let mut params: Vec<String> = query
    .split('&')
    .filter(|param| !param.is_empty())
    .filter(|param| {
      let key = param.split_once('=').map_or(*param, |(key, _)| key);
      key != LIMIT_PARAM && key != OFFSET_PARAM
    })
    .map(str::to_owned)
    .collect();
  params.push(format!("{LIMIT_PARAM}={limit}"));
  if offset > 0 {
    params.push(format!("{OFFSET_PARAM}={offset}"));
  }
  format!("{}?{}", collection_url, params.join("&"))
}
