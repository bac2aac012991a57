
//! API configuration.
//!
//! [`ApiConfig`] is read from the `api` table of Rocket's figment
//! configuration (`Rocket.toml` or `ROCKET_API`) and handed to
//! [`build_rocket_with`](super::build_rocket_with) explicitly. Every
//! field has a default, so the table may be omitted entirely.

use super::throttle::{Rate, GAME_CATEGORIES_SCOPE};

use rocket::figment::Figment;
use serde::{Deserialize, Deserializer};

use std::collections::HashMap;
use std::env;
use std::time::Duration;

pub const SECRET_KEY_ENV_VAR: &str = "JWT_SECRET_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Number of results per page when the client supplies no `limit`.
  pub page_size: i64,
  /// Upper bound on the client-supplied `limit`.
  pub max_page_size: i64,
  /// Absolute URL prefix for generated hyperlinks, such as
  /// `https://games.example.com`. When unset, links are built from
  /// the request's `Host` header.
  pub base_url: Option<String>,
  /// Request quotas, keyed by throttle scope.
  pub throttle_rates: HashMap<String, Rate>,
  /// Secret used to sign bearer tokens. Falls back to the
  /// `JWT_SECRET_KEY` environment variable.
  pub jwt_secret_key: Option<String>,
  /// How long an issued bearer token remains valid, in `humantime`
  /// notation (`"1h"`, `"30m"`).
  #[serde(deserialize_with = "deserialize_duration")]
  pub token_lifetime: Duration,
}

impl ApiConfig {
  /// Reads the `api` table from the given figment, falling back to
  /// defaults for anything not supplied.
  pub fn from_figment(figment: &Figment) -> Result<ApiConfig, rocket::figment::Error> {
    let mut config = if figment.contains("api") {
      figment.extract_inner::<ApiConfig>("api")?
    } else {
      ApiConfig::default()
    };
    if config.jwt_secret_key.is_none() {
      config.jwt_secret_key = env::var(SECRET_KEY_ENV_VAR).ok();
    }
    Ok(config)
  }

  pub fn throttle_rate(&self, scope: &str) -> Option<Rate> {
    self.throttle_rates.get(scope).copied()
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    let mut throttle_rates = HashMap::new();
    throttle_rates.insert(GAME_CATEGORIES_SCOPE.to_owned(), Rate::per_hour(30));
    ApiConfig {
      page_size: 4,
      max_page_size: 8,
      base_url: None,
      throttle_rates,
      jwt_secret_key: None,
      token_lifetime: Duration::from_secs(60 * 60),
    }
  }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where D: Deserializer<'de> {
  let text = String::deserialize(deserializer)?;
  humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
  use super::*;

  use rocket::figment::providers::{Format, Toml};

  #[test]
  fn missing_table_uses_defaults() {
    let config = ApiConfig::from_figment(&Figment::new()).unwrap();
    assert_eq!(config.page_size, 4);
    assert_eq!(config.max_page_size, 8);
    assert_eq!(config.throttle_rate(GAME_CATEGORIES_SCOPE), Some(Rate::per_hour(30)));
  }

  #[test]
  fn table_overrides_defaults() {
    let figment = Figment::from(Toml::string(r#"
      [api]
      page_size = 10
      base_url = "https://games.example.com"
      token_lifetime = "30m"
      jwt_secret_key = "hunter2"

      [api.throttle_rates]
      game-categories = "5/minute"
    "#));
    let config = ApiConfig::from_figment(&figment).unwrap();
    assert_eq!(config.page_size, 10);
    assert_eq!(config.max_page_size, 8);
    assert_eq!(config.base_url.as_deref(), Some("https://games.example.com"));
    assert_eq!(config.token_lifetime, Duration::from_secs(30 * 60));
    assert_eq!(config.jwt_secret_key.as_deref(), Some("hunter2"));
    assert_eq!(config.throttle_rate(GAME_CATEGORIES_SCOPE).unwrap().requests(), 5);
  }

  #[test]
  fn bad_rates_are_rejected() {
    let figment = Figment::from(Toml::string(r#"
      [api.throttle_rates]
      game-categories = "lots"
    "#));
    assert!(ApiConfig::from_figment(&figment).is_err());
  }
}
