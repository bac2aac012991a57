
pub mod header;

use rand::{TryRngCore, CryptoRng};
use rand::rngs::OsRng;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Number of random bytes in a generated API key.
pub const API_KEY_BYTES: usize = 30;

/// Generates an API key from the operating system's source of
/// randomness. Keys are URL-safe base64, so they can travel in
/// headers and in `username:key` Basic credentials unchanged.
pub fn generate_key() -> String {
  generate_key_with(&mut OsRng.unwrap_err())
}

pub fn generate_key_with(rng: &mut impl CryptoRng) -> String {
  let mut bytes = [0u8; API_KEY_BYTES];
  rng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
  use super::*;

  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn keys_are_url_safe() {
    let key = generate_key();
    assert_eq!(key.len(), 40);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
  }

  #[test]
  fn keys_follow_the_rng() {
    let first = generate_key_with(&mut StdRng::seed_from_u64(7));
    let second = generate_key_with(&mut StdRng::seed_from_u64(7));
    assert_eq!(first, second);
    assert_ne!(first, generate_key());
  }
}
