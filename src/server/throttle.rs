
//! Scoped request quotas.
//!
//! Each throttle scope has a [`Rate`]: at most `requests` requests per
//! `period` for any one client. Clients are identified by user id
//! when authenticated and by IP address otherwise. History is kept in
//! process memory with a sliding window.

use super::auth::identify;
use super::config::ApiConfig;
use super::error::ApiError;

use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use serde::Deserialize;
use thiserror::Error;

use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Scope shared by every game category endpoint.
pub const GAME_CATEGORIES_SCOPE: &str = "game-categories";

/// A request quota such as `30/hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rate {
  requests: u32,
  period: Duration,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RateParseError {
  #[error("Rate must have the form <requests>/<period>")]
  MissingSeparator,
  #[error("Invalid request count: {0}")]
  InvalidCount(#[from] ParseIntError),
  #[error("Unknown rate period \"{0}\"")]
  UnknownPeriod(String),
}

/// Timestamps of recent requests, per scope and client.
#[derive(Debug, Default)]
pub struct ThrottleHistory {
  history: Mutex<HashMap<(String, String), VecDeque<Instant>>>,
}

/// Names a throttle scope at the type level, for use with
/// [`Throttled`].
pub trait ThrottleScope: Send + Sync + 'static {
  const NAME: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct GameCategoriesScope;

/// Request guard that succeeds only while the client is within the
/// quota configured for scope `S`. Scopes with no configured rate are
/// unlimited.
#[derive(Debug)]
pub struct Throttled<S>(PhantomData<S>);

impl ThrottleScope for GameCategoriesScope {
  const NAME: &'static str = GAME_CATEGORIES_SCOPE;
}

impl Rate {
  pub const fn new(requests: u32, period: Duration) -> Rate {
    Rate { requests, period }
  }

  pub const fn per_hour(requests: u32) -> Rate {
    Rate::new(requests, Duration::from_secs(60 * 60))
  }

  pub fn requests(&self) -> u32 {
    self.requests
  }

  pub fn period(&self) -> Duration {
    self.period
  }
}

impl FromStr for Rate {
  type Err = RateParseError;

  /// Parses `<requests>/<period>`, where only the first letter of the
  /// period is significant: `s`, `m`, `h` or `d`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (requests, period) = s.split_once('/').ok_or(RateParseError::MissingSeparator)?;
    let requests = requests.trim().parse::<u32>()?;
    let period = period.trim();
    let seconds = match period.chars().next() {
      Some('s') => 1,
      Some('m') => 60,
      Some('h') => 60 * 60,
      Some('d') => 24 * 60 * 60,
      _ => return Err(RateParseError::UnknownPeriod(period.to_owned())),
    };
    Ok(Rate::new(requests, Duration::from_secs(seconds)))
  }
}

impl TryFrom<String> for Rate {
  type Error = RateParseError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

impl Display for Rate {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}/{}s", self.requests, self.period.as_secs())
  }
}

impl ThrottleHistory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a request from `client` against `scope` at time `now`.
  /// If the client is over quota, nothing is recorded and the time
  /// until the next request would be allowed is returned instead.
  ///
  /// Clients of `scope` whose whole window has expired are forgotten.
  pub fn check(&self, scope: &str, client: &str, rate: Rate, now: Instant) -> Result<(), Duration> {
    let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
    history.retain(|(entry_scope, _), entries| {
      entry_scope != scope || entries.back().is_some_and(|newest| now.saturating_duration_since(*newest) < rate.period)
    });
    let key = (scope.to_owned(), client.to_owned());
    let mut entries = history.remove(&key).unwrap_or_default();
    while let Some(oldest) = entries.front() {
      if now.saturating_duration_since(*oldest) >= rate.period {
        entries.pop_front();
      } else {
        break;
      }
    }
    let outcome = if entries.len() >= rate.requests as usize {
      let wait = entries
        .front()
        .map(|oldest| rate.period.saturating_sub(now.saturating_duration_since(*oldest)))
        .unwrap_or(rate.period);
      Err(wait)
    } else {
      entries.push_back(now);
      Ok(())
    };
    if !entries.is_empty() {
      history.insert(key, entries);
    }
    outcome
  }

  #[cfg(test)]
  fn tracked_clients(&self) -> usize {
    self.history.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

#[rocket::async_trait]
impl<'r, S: ThrottleScope> FromRequest<'r> for Throttled<S> {
  type Error = ApiError;

  async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, ApiError> {
    let rate = req.rocket()
      .state::<ApiConfig>()
      .and_then(|config| config.throttle_rate(S::NAME));
    let (Some(rate), Some(history)) = (rate, req.rocket().state::<ThrottleHistory>()) else {
      return request::Outcome::Success(Throttled(PhantomData));
    };
    let client = match identify(req).await {
      Ok(Some(user)) => format!("user:{}", user.id),
      _ => match req.client_ip() {
        Some(ip) => format!("ip:{ip}"),
        None => String::from("anonymous"),
      },
    };
    match history.check(S::NAME, &client, rate, Instant::now()) {
      Ok(()) => request::Outcome::Success(Throttled(PhantomData)),
      Err(wait) => {
        log::info!("Throttled {client} in scope {}", S::NAME);
        request::Outcome::Error((Status::TooManyRequests, ApiError::too_many_requests(wait)))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rates_parse() {
    assert_eq!("30/hour".parse::<Rate>().unwrap(), Rate::per_hour(30));
    assert_eq!("5/m".parse::<Rate>().unwrap(), Rate::new(5, Duration::from_secs(60)));
    assert_eq!("1/day".parse::<Rate>().unwrap().period(), Duration::from_secs(86400));
    assert!(matches!("30".parse::<Rate>(), Err(RateParseError::MissingSeparator)));
    assert!(matches!("x/hour".parse::<Rate>(), Err(RateParseError::InvalidCount(_))));
    assert!(matches!("30/fortnight".parse::<Rate>(), Err(RateParseError::UnknownPeriod(_))));
  }

  #[test]
  fn quota_is_enforced_per_client() {
    let history = ThrottleHistory::new();
    let rate = Rate::new(2, Duration::from_secs(60));
    let start = Instant::now();
    assert!(history.check("scope", "a", rate, start).is_ok());
    assert!(history.check("scope", "a", rate, start + Duration::from_secs(1)).is_ok());
    let wait = history.check("scope", "a", rate, start + Duration::from_secs(10)).unwrap_err();
    assert_eq!(wait, Duration::from_secs(50));
    assert!(history.check("scope", "b", rate, start + Duration::from_secs(10)).is_ok());
    assert!(history.check("other", "a", rate, start + Duration::from_secs(10)).is_ok());
  }

  #[test]
  fn window_slides() {
    let history = ThrottleHistory::new();
    let rate = Rate::new(1, Duration::from_secs(60));
    let start = Instant::now();
    assert!(history.check("scope", "a", rate, start).is_ok());
    assert!(history.check("scope", "a", rate, start + Duration::from_secs(59)).is_err());
    assert!(history.check("scope", "a", rate, start + Duration::from_secs(60)).is_ok());
  }

  #[test]
  fn zero_rate_blocks_everything() {
    let history = ThrottleHistory::new();
    let rate = Rate::new(0, Duration::from_secs(60));
    assert_eq!(history.check("scope", "a", rate, Instant::now()), Err(Duration::from_secs(60)));
    assert_eq!(history.tracked_clients(), 0);
  }

  #[test]
  fn expired_clients_are_forgotten() {
    let history = ThrottleHistory::new();
    let rate = Rate::new(5, Duration::from_secs(60));
    let start = Instant::now();
    assert!(history.check("scope", "10.0.0.1", rate, start).is_ok());
    assert!(history.check("scope", "10.0.0.2", rate, start + Duration::from_secs(30)).is_ok());
    assert!(history.check("other", "10.0.0.1", rate, start).is_ok());
    assert_eq!(history.tracked_clients(), 3);

    // The first client's window has passed; the second's has not.
    assert!(history.check("scope", "10.0.0.3", rate, start + Duration::from_secs(61)).is_ok());
    assert_eq!(history.tracked_clients(), 3);
    assert!(history.check("scope", "10.0.0.3", rate, start + Duration::from_secs(200)).is_ok());
    assert_eq!(history.tracked_clients(), 2);
  }
}
