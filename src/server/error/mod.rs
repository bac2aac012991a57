
pub mod messages;

use crate::store::StoreError;

use rocket::{Request, Catcher, catch, catchers};
use rocket::http::{Header, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::{self, Json};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use utoipa::ToSchema;

use std::fmt::Display;
use std::time::Duration;

pub const WWW_AUTHENTICATE: &str = "Basic realm=\"api\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
  Success,
  Error,
}

#[derive(Debug, Clone, Responder)]
pub struct ApiSuccessResponse<T> {
  json: Json<ApiSuccessResponseBody<T>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiSuccessResponseBody<T> {
  status: ApiStatus,
  #[serde(flatten)]
  body: T,
}

/// Rocket responder which responds using a JSON-like object
/// indicating what went wrong.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
  status: Status,
  message: String,
  /// The request field responsible for a validation failure.
  field: Option<String>,
  retry_after: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPayload {
  status: ApiStatus,
  reason: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  field: Option<String>,
}

impl<T: Serialize> ApiSuccessResponse<T> {
  pub fn new(body: T) -> ApiSuccessResponse<T> {
    let body = ApiSuccessResponseBody {
      status: ApiStatus::Success,
      body
    };
    ApiSuccessResponse {
      json: Json(body),
    }
  }
}

impl ApiError {
  fn with_status(status: Status, message: impl Into<String>) -> ApiError {
    ApiError {
      status,
      message: message.into(),
      field: None,
      retry_after: None,
    }
  }

  pub fn bad_request() -> ApiError {
    ApiError::with_status(Status::BadRequest, messages::BAD_REQUEST)
  }

  /// A 400 Bad Request blaming a single field of the request.
  pub fn invalid_field(field: &str, message: impl Into<String>) -> ApiError {
    ApiError {
      field: Some(field.to_owned()),
      ..ApiError::with_status(Status::BadRequest, message)
    }
  }

  pub fn unauthorized() -> ApiError {
    ApiError::with_status(Status::Unauthorized, messages::UNAUTHORIZED)
  }

  pub fn forbidden() -> ApiError {
    ApiError::with_status(Status::Forbidden, messages::FORBIDDEN)
  }

  pub fn not_found() -> ApiError {
    ApiError::with_status(Status::NotFound, messages::NOT_FOUND)
  }

  /// A 429 Too Many Requests, telling the client how long to wait.
  pub fn too_many_requests(wait: Duration) -> ApiError {
    let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    ApiError {
      retry_after: Some(wait),
      ..ApiError::with_status(
        Status::TooManyRequests,
        format!("{} Expected available in {} seconds.", messages::THROTTLED, seconds),
      )
    }
  }

  /// A 500 Internal Server Error.
  ///
  /// This method takes [`Display`] rather than `str`, as we
  /// frequently pass error-like things to it. We can't take
  /// [`Error`](std::error::Error) since `anyhow` doesn't implement
  /// that.
  pub fn internal_server_error(message: impl Display) -> ApiError {
    ApiError::with_status(Status::InternalServerError, message.to_string())
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn field(&self) -> Option<&str> {
    self.field.as_deref()
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = message.into();
    self
  }
}

impl ErrorPayload {
  pub fn new(message: String, field: Option<String>) -> ErrorPayload {
    ErrorPayload {
      status: ApiStatus::Error,
      reason: message,
      field,
    }
  }
}

impl<'r> Responder<'r, 'static> for ApiError {
  fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
    let payload = ErrorPayload::new(self.message, self.field);
    let mut response = (self.status, Json(payload)).respond_to(req)?;
    if self.status == Status::Unauthorized {
      response.set_header(Header::new("WWW-Authenticate", WWW_AUTHENTICATE));
    }
    if let Some(wait) = self.retry_after {
      let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
      response.set_header(Header::new("Retry-After", seconds.to_string()));
    }
    Ok(response)
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> ApiError {
    match err {
      StoreError::NotFound => ApiError::not_found(),
      StoreError::UniqueViolation(_) => ApiError::invalid_field("name", messages::NAME_TAKEN),
      StoreError::ForeignKeyViolation(message) =>
        ApiError::bad_request().with_message(format!("Foreign key violation: {message}")),
      StoreError::Backend(message) => ApiError::internal_server_error(message),
    }
  }
}

/// A request body that could not be read as JSON.
impl<'a> From<json::Error<'a>> for ApiError {
  fn from(err: json::Error<'a>) -> ApiError {
    let message = match err {
      json::Error::Parse(_, err) => format!("JSON parse error - {err}"),
      err => err.to_string(),
    };
    ApiError::bad_request().with_message(message)
  }
}

pub fn catchers() -> Vec<Catcher> {
  catchers![
    bad_request_catcher,
    unauthorized_catcher,
    forbidden_catcher,
    not_found_catcher,
    unprocessable_entity_catcher,
    too_many_requests_catcher,
    internal_server_error_catcher,
  ]
}

#[catch(400)]
pub fn bad_request_catcher(_: &Request) -> ApiError {
  ApiError::bad_request()
}

#[catch(401)]
pub fn unauthorized_catcher(_: &Request) -> ApiError {
  ApiError::unauthorized()
}

#[catch(403)]
pub fn forbidden_catcher(_: &Request) -> ApiError {
  ApiError::forbidden()
}

#[catch(404)]
pub fn not_found_catcher(_: &Request) -> ApiError {
  ApiError::not_found()
}

/// A path segment that fails to parse, such as a non-numeric id,
/// forwards with 422. No resource lives at such a path.
#[catch(422)]
pub fn unprocessable_entity_catcher(_: &Request) -> ApiError {
  ApiError::not_found()
}

#[catch(429)]
pub fn too_many_requests_catcher(_: &Request) -> ApiError {
  ApiError::with_status(Status::TooManyRequests, messages::THROTTLED)
}

#[catch(500)]
pub fn internal_server_error_catcher(_: &Request) -> ApiError {
  ApiError::internal_server_error("Internal Server Error")
}
