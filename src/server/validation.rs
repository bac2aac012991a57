
//! Field checks for write payloads and filter parameters.
//!
//! Each check names the offending field in its error, so a client
//! can tell which part of the request to fix.

use super::error::{messages, ApiError};
use crate::store::Gender;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

pub const GAME_CATEGORY_NAME_MAX_LENGTH: usize = 200;
pub const GAME_NAME_MAX_LENGTH: usize = 200;
pub const PLAYER_NAME_MAX_LENGTH: usize = 50;

const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_DATETIME: &str =
  "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

/// How a write treats fields missing from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  /// `POST`: required fields must be present.
  Create,
  /// `PUT`: required fields must be present.
  Replace,
  /// `PATCH`: absent fields keep their stored value.
  Partial,
}

impl WriteMode {
  pub fn requires_all(self) -> bool {
    !matches!(self, WriteMode::Partial)
  }
}

/// Passes a present field through. A missing required field is an
/// error, except on partial writes.
pub fn required<T>(field: &str, value: Option<T>, mode: WriteMode) -> Result<Option<T>, ApiError> {
  match value {
    None if mode.requires_all() => Err(ApiError::invalid_field(field, messages::REQUIRED)),
    value => Ok(value),
  }
}

/// Trims surrounding whitespace and checks the result is non-blank
/// and at most `max_length` characters.
pub fn name(field: &str, value: &str, max_length: usize) -> Result<String, ApiError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ApiError::invalid_field(field, messages::BLANK));
  }
  if value.chars().count() > max_length {
    return Err(ApiError::invalid_field(
      field,
      format!("Ensure this field has no more than {max_length} characters."),
    ));
  }
  Ok(value.to_owned())
}

pub fn gender(field: &str, value: &str) -> Result<Gender, ApiError> {
  value.parse().map_err(|err| ApiError::invalid_field(field, format!("{err}")))
}

/// Accepts JSON booleans, `1`/`0`, and their common string spellings.
pub fn boolean(field: &str, value: &Value) -> Result<bool, ApiError> {
  let parsed = match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => match n.as_i64() {
      Some(1) => Some(true),
      Some(0) => Some(false),
      _ => None,
    },
    Value::String(s) => parse_bool(s),
    _ => None,
  };
  parsed.ok_or_else(|| ApiError::invalid_field(field, INVALID_BOOLEAN))
}

/// Accepts JSON integers and strings holding one.
pub fn integer(field: &str, value: &Value) -> Result<i32, ApiError> {
  let parsed = match value {
    Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  };
  parsed.ok_or_else(|| ApiError::invalid_field(field, INVALID_INTEGER))
}

/// Parses an RFC 3339 timestamp. A bare `YYYY-MM-DD` date is read as
/// midnight UTC.
pub fn datetime(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
  let value = value.trim();
  if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
    return Ok(datetime.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|datetime| datetime.and_utc())
    .ok_or_else(|| ApiError::invalid_field(field, INVALID_DATETIME))
}

/// Normalizes a `search` parameter. Blank searches match everything.
pub fn search_term(search: Option<String>) -> Option<String> {
  search
    .map(|search| search.trim().to_owned())
    .filter(|search| !search.is_empty())
}

/// Boolean spelling accepted in query strings and form-style bodies.
pub fn parse_bool(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Some(true),
    "false" | "0" | "no" | "off" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::TimeZone;
  use rocket::http::Status;
  use serde_json::json;

  #[test]
  fn missing_fields_depend_on_mode() {
    let err = required::<String>("name", None, WriteMode::Create).unwrap_err();
    assert_eq!(err.field(), Some("name"));
    assert_eq!(err.message(), messages::REQUIRED);
    assert!(required::<String>("name", None, WriteMode::Replace).is_err());
    assert_eq!(required::<String>("name", None, WriteMode::Partial).unwrap(), None);
  }

  #[test]
  fn names_are_trimmed_and_bounded() {
    assert_eq!(name("name", "  Fire Emblem ", 200).unwrap(), "Fire Emblem");
    assert_eq!(name("name", "   ", 200).unwrap_err().message(), messages::BLANK);
    let err = name("name", &"x".repeat(51), PLAYER_NAME_MAX_LENGTH).unwrap_err();
    assert_eq!(err.status(), Status::BadRequest);
    assert_eq!(err.message(), "Ensure this field has no more than 50 characters.");
  }

  #[test]
  fn genders() {
    assert_eq!(gender("gender", "F").unwrap(), Gender::Female);
    let err = gender("gender", "X").unwrap_err();
    assert_eq!(err.field(), Some("gender"));
    assert_eq!(err.message(), "\"X\" is not a valid choice.");
  }

  #[test]
  fn lenient_booleans() {
    assert!(boolean("played", &json!(true)).unwrap());
    assert!(boolean("played", &json!("true")).unwrap());
    assert!(!boolean("played", &json!(0)).unwrap());
    assert!(!boolean("played", &json!("False")).unwrap());
    assert_eq!(boolean("played", &json!(2)).unwrap_err().field(), Some("played"));
    assert!(boolean("played", &json!(null)).is_err());
  }

  #[test]
  fn integers() {
    assert_eq!(integer("score", &json!(1500)).unwrap(), 1500);
    assert_eq!(integer("score", &json!("-3")).unwrap(), -3);
    assert!(integer("score", &json!(1.5)).is_err());
    assert!(integer("score", &json!(i64::MAX)).is_err());
  }

  #[test]
  fn search_terms() {
    assert_eq!(search_term(Some(" Fire ".to_owned())).as_deref(), Some("Fire"));
    assert_eq!(search_term(Some("  ".to_owned())), None);
    assert_eq!(search_term(None), None);
  }

  #[test]
  fn datetimes() {
    let expected = Utc.with_ymd_and_hms(2016, 2, 9, 10, 0, 0).unwrap();
    assert_eq!(datetime("release_date", "2016-02-09T10:00:00Z").unwrap(), expected);
    assert_eq!(datetime("release_date", "2016-02-09T12:00:00+02:00").unwrap(), expected);
    assert_eq!(
      datetime("release_date", "2016-02-09").unwrap(),
      Utc.with_ymd_and_hms(2016, 2, 9, 0, 0, 0).unwrap(),
    );
    assert_eq!(datetime("release_date", "yesterday").unwrap_err().field(), Some("release_date"));
  }
}
