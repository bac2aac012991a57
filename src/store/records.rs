
//! Joined views of stored entities, as handed to the HTTP layer.
//!
//! Rows in [`crate::db::models`] hold numeric foreign keys. The
//! records here carry the related names and nested entities that the
//! wire representations need, so that handlers never have to issue
//! follow-up lookups of their own.

use crate::db::models;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use std::fmt::{self, Display};
use std::str::FromStr;

/// Gender of a player, stored as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
  #[serde(rename = "M")]
  Male,
  #[serde(rename = "F")]
  Female,
}

#[derive(Debug, Clone, Error)]
#[error("\"{code}\" is not a valid choice.")]
pub struct InvalidGender {
  code: String,
}

#[derive(Debug, Clone)]
pub struct GameCategoryRecord {
  pub id: i32,
  pub name: String,
  /// Ids of the games in this category, ordered by game name.
  pub game_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct GameRecord {
  pub game: models::Game,
  /// Name of the game's category.
  pub game_category: String,
  /// Username of the owner.
  pub owner: String,
}

#[derive(Debug, Clone)]
pub struct PlayerRecord {
  pub id: i32,
  pub created: DateTime<Utc>,
  pub name: String,
  pub gender: Gender,
  /// The player's scores, highest first, each with its game.
  pub scores: Vec<ScoreWithGame>,
}

#[derive(Debug, Clone)]
pub struct ScoreWithGame {
  pub id: i32,
  pub score: i32,
  pub score_date: DateTime<Utc>,
  pub game: GameRecord,
}

#[derive(Debug, Clone)]
pub struct PlayerScoreRecord {
  pub score: models::PlayerScore,
  /// Name of the player who scored.
  pub player: String,
  /// Name of the game the score was recorded in.
  pub game: String,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
  pub id: i32,
  pub username: String,
  /// Games owned by this user, ordered by name.
  pub games: Vec<GameLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLink {
  pub id: i32,
  pub name: String,
}

impl Gender {
  pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

  pub fn code(self) -> &'static str {
    match self {
      Gender::Male => "M",
      Gender::Female => "F",
    }
  }

  /// Human-readable label for the gender code.
  pub fn description(self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
    }
  }
}

impl Default for Gender {
  fn default() -> Self {
    Gender::Male
  }
}

impl Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for Gender {
  type Err = InvalidGender;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Gender::ALL
      .into_iter()
      .find(|gender| gender.code() == s)
      .ok_or_else(|| InvalidGender { code: s.to_owned() })
  }
}

impl GameRecord {
  pub fn id(&self) -> i32 {
    self.game.id
  }
}
