
use crate::server::error::ApiError;

use rocket::request::{self, Request, FromRequest};

pub const X_API_KEY_HEADER: &str = "X-Api-Key";

/// Rocket request guard for the `X-Api-Key` header. Blank keys are
/// treated as missing.
#[derive(Debug, Clone)]
pub struct XApiKey<'r>(pub &'r str);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for XApiKey<'r> {
  type Error = ApiError;

  async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, ApiError> {
    let api_key = req.headers()
      .get_one(X_API_KEY_HEADER)
      .map(str::trim)
      .filter(|key| !key.is_empty());
    match api_key {
      Some(api_key) => request::Outcome::Success(XApiKey(api_key)),
      None => {
        let err = ApiError::bad_request().with_message(format!("Missing {X_API_KEY_HEADER} header"));
        request::Outcome::Error((err.status(), err))
      }
    }
  }
}
