
//! The entity store.
//!
//! [`Store`] is the seam between the HTTP layer and persistence. The
//! PostgreSQL backend ([`PgStore`]) is used in production, while
//! [`MemoryStore`] backs local development and the test suite. Both
//! enforce the same uniqueness, foreign key and cascading-delete
//! rules.

mod memory;
mod pg;
pub mod query;
pub mod records;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use query::{Direction, GameCategoryFilter, GameFilter, GameOrderField, GameOrdering, Page, PageRequest, PlayerFilter};
pub use records::{Gender, GameCategoryRecord, GameLink, GameRecord, PlayerRecord, PlayerScoreRecord, ScoreWithGame, UserRecord};

use crate::db::models;

use thiserror::Error;
use uuid::Uuid;

use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared through Rocket managed state.
pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StoreError {
  #[error("Not Found")]
  NotFound,
  #[error("Uniqueness error: {0}")]
  UniqueViolation(String),
  #[error("Foreign key violation: {0}")]
  ForeignKeyViolation(String),
  #[error("{0}")]
  Backend(String),
}

#[rocket::async_trait]
pub trait Store: Send + Sync {
  async fn list_game_categories(&self, filter: &GameCategoryFilter, page: PageRequest) -> StoreResult<Page<GameCategoryRecord>>;
  async fn get_game_category(&self, id: i32) -> StoreResult<Option<GameCategoryRecord>>;
  async fn find_game_category_id(&self, name: &str) -> StoreResult<Option<i32>>;
  async fn create_game_category(&self, new_category: models::NewGameCategory) -> StoreResult<GameCategoryRecord>;
  async fn update_game_category(&self, id: i32, changes: models::GameCategoryChanges) -> StoreResult<GameCategoryRecord>;
  /// Deletes the category along with all of its games.
  async fn delete_game_category(&self, id: i32) -> StoreResult<()>;

  async fn list_games(&self, filter: &GameFilter, page: PageRequest) -> StoreResult<Page<GameRecord>>;
  async fn get_game(&self, id: i32) -> StoreResult<Option<GameRecord>>;
  async fn find_game_id(&self, name: &str) -> StoreResult<Option<i32>>;
  async fn create_game(&self, new_game: models::NewGame) -> StoreResult<GameRecord>;
  async fn update_game(&self, id: i32, changes: models::GameChanges) -> StoreResult<GameRecord>;
  /// Deletes the game along with every score recorded in it.
  async fn delete_game(&self, id: i32) -> StoreResult<()>;

  async fn list_players(&self, filter: &PlayerFilter, page: PageRequest) -> StoreResult<Page<PlayerRecord>>;
  async fn get_player(&self, id: i32) -> StoreResult<Option<PlayerRecord>>;
  async fn find_player_id(&self, name: &str) -> StoreResult<Option<i32>>;
  async fn create_player(&self, new_player: models::NewPlayer) -> StoreResult<PlayerRecord>;
  async fn update_player(&self, id: i32, changes: models::PlayerChanges) -> StoreResult<PlayerRecord>;
  /// Deletes the player along with all of their scores.
  async fn delete_player(&self, id: i32) -> StoreResult<()>;

  async fn list_player_scores(&self, page: PageRequest) -> StoreResult<Page<PlayerScoreRecord>>;
  async fn get_player_score(&self, id: i32) -> StoreResult<Option<PlayerScoreRecord>>;
  async fn create_player_score(&self, new_score: models::NewPlayerScore) -> StoreResult<PlayerScoreRecord>;
  async fn update_player_score(&self, id: i32, changes: models::PlayerScoreChanges) -> StoreResult<PlayerScoreRecord>;
  async fn delete_player_score(&self, id: i32) -> StoreResult<()>;

  async fn list_users(&self, page: PageRequest) -> StoreResult<Page<UserRecord>>;
  async fn get_user(&self, id: i32) -> StoreResult<Option<UserRecord>>;
  async fn find_user_by_uuid(&self, user_uuid: &Uuid) -> StoreResult<Option<models::User>>;
  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<models::User>>;
  async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<models::User>>;
  async fn create_user(&self, new_user: models::NewUser) -> StoreResult<models::User>;

  /// Looks up the user with the given username, provided that the
  /// supplied API key is theirs.
  async fn authenticate(&self, username: &str, api_key: &str) -> StoreResult<Option<models::User>> {
    let user = self.find_user_by_username(username).await?;
    Ok(user.filter(|user| user.api_key.as_deref() == Some(api_key)))
  }
}
