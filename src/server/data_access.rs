
//! Wire representations of stored entities, and the payloads clients
//! send to create or modify them.
//!
//! Related entities are referenced by name on the wire. Resolving
//! those names to ids happens in [`resolve`](super::resolve), and
//! checking payload fields in [`validation`](super::validation).

use super::urls::BaseUrl;
use crate::store::{Gender, GameCategoryRecord, GameLink, GameRecord, PlayerRecord, PlayerScoreRecord, ScoreWithGame, UserRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
  /// A fresh JWT token associated to the user.
  pub token: String,
}

/// Links to every top-level collection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexResponse {
  pub players: String,
  #[serde(rename = "game-categories")]
  pub game_categories: String,
  pub games: String,
  pub scores: String,
  pub users: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameCategoryResponse {
  pub url: String,
  pub pk: i32,
  pub name: String,
  /// Links to the games in this category.
  pub games: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameResponse {
  pub url: String,
  /// Username of the user who created the game.
  pub owner: String,
  /// Name of the game's category.
  pub game_category: String,
  pub name: String,
  #[schema(value_type = String, example = "2024-03-01T00:00:00Z")]
  pub release_date: DateTime<Utc>,
  pub played: bool,
}

/// A score as embedded in its player, with the full game inline.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerScoreWithGameResponse {
  pub url: String,
  pub pk: i32,
  pub score: i32,
  #[schema(value_type = String, example = "2024-03-01T12:00:00Z")]
  pub score_date: DateTime<Utc>,
  pub game: GameResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerResponse {
  pub url: String,
  pub name: String,
  pub gender: Gender,
  /// `Male` or `Female`.
  pub gender_description: String,
  /// The player's scores, highest first.
  pub scores: Vec<PlayerScoreWithGameResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerScoreResponse {
  pub url: String,
  pub pk: i32,
  pub score: i32,
  #[schema(value_type = String, example = "2024-03-01T12:00:00Z")]
  pub score_date: DateTime<Utc>,
  /// Name of the player.
  pub player: String,
  /// Name of the game.
  pub game: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserGameResponse {
  pub url: String,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
  pub url: String,
  pub pk: i32,
  pub username: String,
  pub games: Vec<UserGameResponse>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GameCategoryDao {
  pub name: Option<String>,
}

/// Body of a game write. Any `owner` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GameDao {
  pub name: Option<String>,
  /// Name of an existing game category.
  pub game_category: Option<String>,
  /// RFC 3339 timestamp.
  #[schema(value_type = Option<String>, example = "2024-03-01T00:00:00Z")]
  pub release_date: Option<String>,
  /// `true`/`false`, also accepted as the strings `"true"`/`"false"`
  /// or the integers `1`/`0`.
  #[schema(value_type = Option<bool>)]
  pub played: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PlayerDao {
  pub name: Option<String>,
  /// `M` or `F`. Defaults to `M` on creation.
  pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PlayerScoreDao {
  /// Name of an existing player.
  pub player: Option<String>,
  /// Name of an existing game.
  pub game: Option<String>,
  #[schema(value_type = Option<i32>)]
  pub score: Option<Value>,
  /// RFC 3339 timestamp.
  #[schema(value_type = Option<String>, example = "2024-03-01T12:00:00Z")]
  pub score_date: Option<String>,
}

impl IndexResponse {
  pub fn new(urls: &BaseUrl) -> Self {
    Self {
      players: urls.players(),
      game_categories: urls.game_categories(),
      games: urls.games(),
      scores: urls.player_scores(),
      users: urls.users(),
    }
  }
}

impl GameCategoryResponse {
  pub fn new(record: GameCategoryRecord, urls: &BaseUrl) -> Self {
    Self {
      url: urls.game_category(record.id),
      pk: record.id,
      name: record.name,
      games: record.game_ids.into_iter().map(|id| urls.game(id)).collect(),
    }
  }
}

impl GameResponse {
  pub fn new(record: GameRecord, urls: &BaseUrl) -> Self {
    Self {
      url: urls.game(record.game.id),
      owner: record.owner,
      game_category: record.game_category,
      name: record.game.name,
      release_date: record.game.release_date,
      played: record.game.played,
    }
  }
}

impl PlayerScoreWithGameResponse {
  pub fn new(score: ScoreWithGame, urls: &BaseUrl) -> Self {
    Self {
      url: urls.player_score(score.id),
      pk: score.id,
      score: score.score,
      score_date: score.score_date,
      game: GameResponse::new(score.game, urls),
    }
  }
}

impl PlayerResponse {
  pub fn new(record: PlayerRecord, urls: &BaseUrl) -> Self {
    Self {
      url: urls.player(record.id),
      name: record.name,
      gender: record.gender,
      gender_description: record.gender.description().to_owned(),
      scores: record.scores.into_iter().map(|score| PlayerScoreWithGameResponse::new(score, urls)).collect(),
    }
  }
}

impl PlayerScoreResponse {
  pub fn new(record: PlayerScoreRecord, urls: &BaseUrl) -> Self {
    Self {
      url: urls.player_score(record.score.id),
      pk: record.score.id,
      score: record.score.score,
      score_date: record.score.score_date,
      player: record.player,
      game: record.game,
    }
  }
}

impl UserGameResponse {
  pub fn new(game: GameLink, urls: &BaseUrl) -> Self {
    Self {
      url: urls.game(game.id),
      name: game.name,
    }
  }
}

impl UserResponse {
  pub fn new(record: UserRecord, urls: &BaseUrl) -> Self {
    Self {
      url: urls.user(record.id),
      pk: record.id,
      username: record.username,
      games: record.games.into_iter().map(|game| UserGameResponse::new(game, urls)).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::models;

  use chrono::TimeZone;
  use serde_json::json;

  fn game_record() -> GameRecord {
    GameRecord {
      game: models::Game {
        id: 7,
        owner_id: 1,
        created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        name: "Firewatch".to_owned(),
        game_category_id: 2,
        release_date: Utc.with_ymd_and_hms(2016, 2, 9, 0, 0, 0).unwrap(),
        played: true,
      },
      game_category: "Adventure".to_owned(),
      owner: "kevin".to_owned(),
    }
  }

  #[test]
  fn game_wire_format() {
    let urls = BaseUrl::new("http://testserver");
    let value = serde_json::to_value(GameResponse::new(game_record(), &urls)).unwrap();
    assert_eq!(value, json!({
      "url": "http://testserver/games/7/",
      "owner": "kevin",
      "game_category": "Adventure",
      "name": "Firewatch",
      "release_date": "2016-02-09T00:00:00Z",
      "played": true,
    }));
  }

  #[test]
  fn player_embeds_scores_with_games() {
    let urls = BaseUrl::new("http://testserver");
    let record = PlayerRecord {
      id: 3,
      created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
      name: "Brandon".to_owned(),
      gender: Gender::Female,
      scores: vec![ScoreWithGame {
        id: 11,
        score: 3000,
        score_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        game: game_record(),
      }],
    };
    let value = serde_json::to_value(PlayerResponse::new(record, &urls)).unwrap();
    assert_eq!(value["gender"], "F");
    assert_eq!(value["gender_description"], "Female");
    assert_eq!(value["scores"][0]["url"], "http://testserver/player-scores/11/");
    assert_eq!(value["scores"][0]["game"]["name"], "Firewatch");
  }

  #[test]
  fn index_uses_hyphenated_key() {
    let value = serde_json::to_value(IndexResponse::new(&BaseUrl::new("http://testserver"))).unwrap();
    assert_eq!(value["game-categories"], "http://testserver/game-categories/");
    assert_eq!(value["scores"], "http://testserver/player-scores/");
  }

  #[test]
  fn game_payload_ignores_owner() {
    let dao: GameDao = serde_json::from_value(json!({"name": "Doom", "owner": "mallory", "played": "true"})).unwrap();
    assert_eq!(dao.name.as_deref(), Some("Doom"));
    assert_eq!(dao.played, Some(json!("true")));
  }
}
