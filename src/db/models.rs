
use diesel::prelude::*;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = super::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
  pub id: i32,
  pub user_uuid: Uuid,
  pub username: String,
  pub api_key: Option<String>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = super::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
  pub user_uuid: Uuid,
  pub username: String,
  pub api_key: Option<String>,
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = super::schema::game_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GameCategory {
  pub id: i32,
  pub name: String,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = super::schema::game_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewGameCategory {
  pub name: String,
}

#[derive(AsChangeset, Clone, Debug, Default)]
#[diesel(table_name = super::schema::game_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GameCategoryChanges {
  pub name: Option<String>,
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = super::schema::games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Game {
  pub id: i32,
  pub owner_id: i32,
  pub created: DateTime<Utc>,
  pub name: String,
  pub game_category_id: i32,
  pub release_date: DateTime<Utc>,
  pub played: bool,
}

/// A game about to be inserted. The `created` timestamp is assigned
/// by the store.
#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = super::schema::games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewGame {
  pub owner_id: i32,
  pub name: String,
  pub game_category_id: i32,
  pub release_date: DateTime<Utc>,
  pub played: bool,
}

/// Mutable columns of a game. The owner is deliberately absent: it
/// is fixed at creation.
#[derive(AsChangeset, Clone, Debug, Default)]
#[diesel(table_name = super::schema::games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GameChanges {
  pub name: Option<String>,
  pub game_category_id: Option<i32>,
  pub release_date: Option<DateTime<Utc>>,
  pub played: Option<bool>,
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = super::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Player {
  pub id: i32,
  pub created: DateTime<Utc>,
  pub name: String,
  pub gender: String,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = super::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPlayer {
  pub name: String,
  pub gender: String,
}

#[derive(AsChangeset, Clone, Debug, Default)]
#[diesel(table_name = super::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlayerChanges {
  pub name: Option<String>,
  pub gender: Option<String>,
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = super::schema::player_scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlayerScore {
  pub id: i32,
  pub player_id: i32,
  pub game_id: i32,
  pub score: i32,
  pub score_date: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = super::schema::player_scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPlayerScore {
  pub player_id: i32,
  pub game_id: i32,
  pub score: i32,
  pub score_date: DateTime<Utc>,
}

#[derive(AsChangeset, Clone, Debug, Default)]
#[diesel(table_name = super::schema::player_scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlayerScoreChanges {
  pub player_id: Option<i32>,
  pub game_id: Option<i32>,
  pub score: Option<i32>,
  pub score_date: Option<DateTime<Utc>>,
}

impl GameCategoryChanges {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
  }
}

impl GameChanges {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.game_category_id.is_none()
      && self.release_date.is_none()
      && self.played.is_none()
  }
}

impl PlayerChanges {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.gender.is_none()
  }
}

impl PlayerScoreChanges {
  pub fn is_empty(&self) -> bool {
    self.player_id.is_none()
      && self.game_id.is_none()
      && self.score.is_none()
      && self.score_date.is_none()
  }
}
