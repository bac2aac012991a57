
//! Absolute resource URLs.
//!
//! Every route is mounted without a trailing slash, and the
//! [`strip_trailing_slash`] fairing rewrites `/games/1/` to
//! `/games/1` before routing, so both spellings reach the same
//! handler. Generated links always carry the trailing slash.

use super::config::ApiConfig;

use rocket::fairing::AdHoc;
use rocket::http::uri::Origin;
use rocket::request::{self, FromRequest, Request};

use std::convert::Infallible;

pub const GAME_CATEGORIES_PATH: &str = "/game-categories";
pub const GAMES_PATH: &str = "/games";
pub const PLAYERS_PATH: &str = "/players";
pub const PLAYER_SCORES_PATH: &str = "/player-scores";
pub const USERS_PATH: &str = "/users";

/// Paths which must keep their trailing slash.
const VERBATIM_PREFIXES: [&str; 2] = ["/swagger-ui", "/api-docs"];

/// Scheme and authority prefixed to every generated link, such as
/// `http://localhost:8000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
  pub fn new(base: &str) -> BaseUrl {
    BaseUrl(base.trim_end_matches('/').to_owned())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  fn collection(&self, path: &str) -> String {
    format!("{}{}/", self.0, path)
  }

  fn member(&self, path: &str, id: i32) -> String {
    format!("{}{}/{}/", self.0, path, id)
  }

  pub fn index(&self) -> String {
    format!("{}/", self.0)
  }

  pub fn game_categories(&self) -> String {
    self.collection(GAME_CATEGORIES_PATH)
  }

  pub fn game_category(&self, id: i32) -> String {
    self.member(GAME_CATEGORIES_PATH, id)
  }

  pub fn games(&self) -> String {
    self.collection(GAMES_PATH)
  }

  pub fn game(&self, id: i32) -> String {
    self.member(GAMES_PATH, id)
  }

  pub fn players(&self) -> String {
    self.collection(PLAYERS_PATH)
  }

  pub fn player(&self, id: i32) -> String {
    self.member(PLAYERS_PATH, id)
  }

  pub fn player_scores(&self) -> String {
    self.collection(PLAYER_SCORES_PATH)
  }

  pub fn player_score(&self, id: i32) -> String {
    self.member(PLAYER_SCORES_PATH, id)
  }

  pub fn users(&self) -> String {
    self.collection(USERS_PATH)
  }

  pub fn user(&self, id: i32) -> String {
    self.member(USERS_PATH, id)
  }
}

/// The configured `base_url` if there is one, otherwise the request's
/// `Host` header over plain HTTP.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for BaseUrl {
  type Error = Infallible;

  async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Infallible> {
    let configured = req.rocket()
      .state::<ApiConfig>()
      .and_then(|config| config.base_url.as_deref());
    let base = match (configured, req.host()) {
      (Some(base), _) => BaseUrl::new(base),
      (None, Some(host)) => BaseUrl::new(&format!("http://{host}")),
      (None, None) => BaseUrl::new("http://localhost"),
    };
    request::Outcome::Success(base)
  }
}

pub fn strip_trailing_slash() -> AdHoc {
  AdHoc::on_request("Strip trailing slash", |req, _| {
    if let Some(uri) = without_trailing_slash(req.uri()) {
      req.set_uri(uri);
    }
    Box::pin(async {})
  })
}

fn without_trailing_slash(uri: &Origin<'_>) -> Option<Origin<'static>> {
  let path = uri.path().as_str();
  if path == "/" || !path.ends_with('/') || VERBATIM_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
    return None;
  }
  let trimmed = path.trim_end_matches('/');
  let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
  let rewritten = match uri.query() {
    Some(query) => format!("{}?{}", trimmed, query.as_str()),
    None => trimmed.to_owned(),
  };
  Origin::parse_owned(rewritten).ok()
}
