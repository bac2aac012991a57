
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use thiserror::Error;
use jsonwebtoken::{encode, decode, EncodingKey, DecodingKey, Validation, Header};

use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all="camelCase")]
pub struct JwtClaim {
  /// The user's UUID being claimed.
  pub sub: Uuid,
  /// Expiration time, in seconds since the Unix epoch.
  pub exp: usize,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum JwtError {
  #[error("{0}")]
  JsonWebTokenError(#[from] jsonwebtoken::errors::Error),
  #[error("No JWT secret key is configured")]
  MissingSecretKey,
}

pub fn create_token(user_uuid: &Uuid, secret: &str, lifetime: Duration) -> Result<String, JwtError> {
  let claim = JwtClaim {
    sub: user_uuid.to_owned(),
    exp: (chrono::Utc::now().timestamp() as u64).saturating_add(lifetime.as_secs()) as usize,
  };
  let token = encode(
    &Header::default(),
    &claim,
    &EncodingKey::from_secret(secret.as_bytes()),
  )?;
  Ok(token)
}

pub fn verify_token(token_str: &str, secret: &str) -> Result<Uuid, JwtError> {
  let claims = decode::<JwtClaim>(
    token_str,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )?;
  Ok(claims.claims.sub)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "unit-test-secret";

  #[test]
  fn token_round_trip() {
    let user_uuid = Uuid::new_v4();
    let token = create_token(&user_uuid, SECRET, Duration::from_secs(60)).unwrap();
    assert_eq!(verify_token(&token, SECRET).unwrap(), user_uuid);
  }

  #[test]
  fn token_with_wrong_secret_is_rejected() {
    let token = create_token(&Uuid::new_v4(), SECRET, Duration::from_secs(60)).unwrap();
    assert!(verify_token(&token, "some-other-secret").is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let claim = JwtClaim {
      sub: Uuid::new_v4(),
      exp: (chrono::Utc::now().timestamp() - 3600) as usize,
    };
    let token = encode(&Header::default(), &claim, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    assert!(verify_token(&token, SECRET).is_err());
  }
}
