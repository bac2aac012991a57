
//! Resolution of name references in request bodies.
//!
//! Clients refer to related categories, games and players by name.
//! These helpers turn a name into the id stored in the foreign key,
//! failing with a 400 that names the request field.

use super::error::ApiError;
use crate::store::Store;

fn does_not_exist(field: &str, name: &str) -> ApiError {
  ApiError::invalid_field(field, format!("Object with name={name} does not exist."))
}

pub async fn game_category_id<S: Store + ?Sized>(store: &S, field: &str, name: &str) -> Result<i32, ApiError> {
  store.find_game_category_id(name)
    .await?
    .ok_or_else(|| does_not_exist(field, name))
}

pub async fn game_id<S: Store + ?Sized>(store: &S, field: &str, name: &str) -> Result<i32, ApiError> {
  store.find_game_id(name)
    .await?
    .ok_or_else(|| does_not_exist(field, name))
}

pub async fn player_id<S: Store + ?Sized>(store: &S, field: &str, name: &str) -> Result<i32, ApiError> {
  store.find_player_id(name)
    .await?
    .ok_or_else(|| does_not_exist(field, name))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::models::NewGameCategory;
  use crate::store::MemoryStore;

  #[rocket::async_test]
  async fn resolves_existing_names() {
    let store = MemoryStore::new();
    let category = store.create_game_category(NewGameCategory { name: "Shooter".to_owned() }).await.unwrap();
    assert_eq!(game_category_id(&store, "game_category", "Shooter").await.unwrap(), category.id);
  }

  #[rocket::async_test]
  async fn missing_names_blame_the_field() {
    let store = MemoryStore::new();
    let err = game_category_id(&store, "game_category", "Nope").await.unwrap_err();
    assert_eq!(err.field(), Some("game_category"));
    assert_eq!(err.message(), "Object with name=Nope does not exist.");
    assert!(player_id(&store, "player", "Nobody").await.is_err());
    assert!(game_id(&store, "game", "Nothing").await.is_err());
  }
}
