
//! Utility functions for HTTP headers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use std::fmt::{self, Display};
use std::str::FromStr;

/// Rust-side representation of the HTTP "Authorization" header.
#[derive(Debug, Clone)]
pub struct Authorization {
  pub scheme: String,
  pub params: String,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AuthorizationParseError {
  #[error("Could not find authorization scheme")]
  MissingScheme,
  #[error("Credentials are not valid base64")]
  InvalidBase64(#[from] base64::DecodeError),
  #[error("Credentials are not valid UTF-8")]
  InvalidUtf8(#[from] std::string::FromUtf8Error),
  #[error("Credentials must have the form <username>:<password>")]
  MissingSeparator,
}

impl Authorization {
  pub fn is_scheme(&self, scheme: &str) -> bool {
    self.scheme.eq_ignore_ascii_case(scheme)
  }

  /// Decodes the `username:password` pair carried by the `Basic`
  /// scheme.
  pub fn basic_credentials(&self) -> Result<(String, String), AuthorizationParseError> {
    let decoded = String::from_utf8(STANDARD.decode(self.params.trim())?)?;
    let (username, password) = decoded.split_once(':').ok_or(AuthorizationParseError::MissingSeparator)?;
    Ok((username.to_owned(), password.to_owned()))
  }

  /// Builds a `Basic` authorization header value.
  pub fn basic(username: &str, password: &str) -> Authorization {
    Authorization {
      scheme: String::from("Basic"),
      params: STANDARD.encode(format!("{username}:{password}")),
    }
  }
}

impl Display for Authorization {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} {}", self.scheme, self.params)
  }
}

impl FromStr for Authorization {
  type Err = AuthorizationParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some((scheme, params)) = s.split_once(' ') {
      Ok(Authorization {
        scheme: scheme.to_owned(),
        params: params.to_owned(),
      })
    } else {
      Err(AuthorizationParseError::MissingScheme)
    }
  }
}
