
//! Request authentication.
//!
//! Two credentials are accepted in the `Authorization` header:
//!
//! * `Basic` with `username:api_key`, and
//! * `Bearer` with a JWT issued by `POST /authorize`.
//!
//! A request without an `Authorization` header is anonymous. A
//! request whose credentials do not check out is rejected with 401,
//! even on endpoints that would otherwise admit anonymous callers.

mod header;
mod jwt;

pub use header::{XApiKey, X_API_KEY_HEADER};
pub use jwt::{create_token, verify_token, JwtClaim, JwtError};

use super::config::ApiConfig;
use super::error::{messages, ApiError};
use crate::db::models::User;
use crate::store::{SharedStore, StoreError};
use crate::util::header::Authorization;

use rocket::request::{self, FromRequest, Request};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AuthError {
  #[error("{0}")]
  JwtError(#[from] JwtError),
  #[error("{0}")]
  StoreError(#[from] StoreError),
  #[error("Invalid API key")]
  InvalidApiKey,
}

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// The user a request was authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
  pub id: i32,
  pub user_uuid: Uuid,
  pub username: String,
}

/// Request guard for endpoints open to anonymous callers. Carries the
/// authenticated user when there is one.
#[derive(Debug, Clone)]
pub struct Caller(Option<AuthenticatedUser>);

/// Per-request cache of the identification result.
struct CachedIdentity(Result<Option<AuthenticatedUser>, ApiError>);

pub async fn create_jwt_for_api_key(
  api_key: &str,
  store: &SharedStore,
  config: &ApiConfig,
) -> Result<String, AuthError> {
  let Some(user) = store.find_user_by_api_key(api_key).await? else {
    return Err(AuthError::InvalidApiKey);
  };
  let secret = config.jwt_secret_key.as_deref().ok_or(JwtError::MissingSecretKey)?;
  let token = create_token(&user.user_uuid, secret, config.token_lifetime)?;
  Ok(token)
}

/// Works out who sent the request. The result is computed once per
/// request.
pub async fn identify(req: &Request<'_>) -> Result<Option<AuthenticatedUser>, ApiError> {
  let cached = req.local_cache_async(async {
    CachedIdentity(identify_uncached(req).await)
  }).await;
  cached.0.clone()
}

async fn identify_uncached(req: &Request<'_>) -> Result<Option<AuthenticatedUser>, ApiError> {
  let Some(header) = req.headers().get_one(AUTHORIZATION_HEADER) else {
    return Ok(None);
  };
  let invalid_credentials = || ApiError::unauthorized().with_message(messages::INVALID_CREDENTIALS);
  let invalid_token = || ApiError::unauthorized().with_message(messages::INVALID_TOKEN);
  let authorization: Authorization = header.parse().map_err(|_| invalid_credentials())?;
  let store = req.rocket()
    .state::<SharedStore>()
    .ok_or_else(|| ApiError::internal_server_error("No store is configured"))?;

  let user = if authorization.is_scheme("Basic") {
    let (username, api_key) = authorization.basic_credentials().map_err(|_| invalid_credentials())?;
    store.authenticate(&username, &api_key).await?.ok_or_else(invalid_credentials)?
  } else if authorization.is_scheme("Bearer") {
    let secret = req.rocket()
      .state::<ApiConfig>()
      .and_then(|config| config.jwt_secret_key.as_deref())
      .ok_or_else(|| ApiError::internal_server_error(JwtError::MissingSecretKey))?;
    let user_uuid = verify_token(authorization.params.trim(), secret).map_err(|err| {
      log::debug!("Rejected bearer token: {err}");
      invalid_token()
    })?;
    store.find_user_by_uuid(&user_uuid).await?.ok_or_else(invalid_token)?
  } else {
    return Err(invalid_credentials());
  };
  Ok(Some(AuthenticatedUser::from(user)))
}

impl From<User> for AuthenticatedUser {
  fn from(user: User) -> Self {
    AuthenticatedUser {
      id: user.id,
      user_uuid: user.user_uuid,
      username: user.username,
    }
  }
}

impl Caller {
  pub fn user(&self) -> Option<&AuthenticatedUser> {
    self.0.as_ref()
  }

  /// The authenticated user, or 401 for anonymous callers.
  pub fn require_user(&self) -> Result<&AuthenticatedUser, ApiError> {
    self.user().ok_or_else(ApiError::unauthorized)
  }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
  type Error = ApiError;

  async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, ApiError> {
    match identify(req).await {
      Ok(user) => request::Outcome::Success(Caller(user)),
      Err(err) => request::Outcome::Error((err.status(), err)),
    }
  }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
  type Error = ApiError;

  async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, ApiError> {
    let err = match identify(req).await {
      Ok(Some(user)) => return request::Outcome::Success(user),
      Ok(None) => ApiError::unauthorized(),
      Err(err) => err,
    };
    request::Outcome::Error((err.status(), err))
  }
}
