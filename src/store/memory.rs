
//! In-memory [`Store`] backend.
//!
//! All tables live behind a single mutex, so every operation is
//! atomic with respect to every other. Nothing is persisted.

use super::query::{starts_with_ignore_case, Direction, GameOrderField, GameOrdering};
use super::{
  GameCategoryFilter, GameCategoryRecord, GameFilter, GameLink, GameRecord, Gender, Page,
  PageRequest, PlayerFilter, PlayerRecord, PlayerScoreRecord, ScoreWithGame, Store, StoreError,
  StoreResult, UserRecord,
};
use crate::db::models;

use chrono::Utc;
use uuid::Uuid;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
  users: BTreeMap<i32, models::User>,
  game_categories: BTreeMap<i32, models::GameCategory>,
  games: BTreeMap<i32, models::Game>,
  players: BTreeMap<i32, models::Player>,
  player_scores: BTreeMap<i32, models::PlayerScore>,
  user_ids: Sequence,
  game_category_ids: Sequence,
  game_ids: Sequence,
  player_ids: Sequence,
  player_score_ids: Sequence,
}

/// Serial primary key generator. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
struct Sequence(i32);

impl Sequence {
  fn next(&mut self) -> i32 {
    self.0 += 1;
    self.0
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
    self.tables
      .lock()
      .map_err(|_| StoreError::Backend(String::from("In-memory store lock poisoned")))
  }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
  let count = items.len() as i64;
  let items = items
    .into_iter()
    .skip(page.offset.max(0) as usize)
    .take(page.limit.max(0) as usize)
    .collect();
  Page { count, items }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
  match direction {
    Direction::Ascending => ordering,
    Direction::Descending => ordering.reverse(),
  }
}

fn unique_violation(what: &str, name: &str) -> StoreError {
  StoreError::UniqueViolation(format!("{what} with name \"{name}\" already exists"))
}

fn dangling(what: &str, id: i32) -> StoreError {
  StoreError::ForeignKeyViolation(format!("{what} {id} does not exist"))
}

impl Tables {
  fn category_name_taken(&self, name: &str, except: Option<i32>) -> bool {
    self.game_categories.values().any(|c| c.name == name && Some(c.id) != except)
  }

  fn game_name_taken(&self, name: &str, except: Option<i32>) -> bool {
    self.games.values().any(|g| g.name == name && Some(g.id) != except)
  }

  fn player_name_taken(&self, name: &str, except: Option<i32>) -> bool {
    self.players.values().any(|p| p.name == name && Some(p.id) != except)
  }

  fn games_by_name(&self, mut predicate: impl FnMut(&models::Game) -> bool) -> Vec<&models::Game> {
    let mut games: Vec<_> = self.games.values().filter(|g| predicate(*g)).collect();
    games.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    games
  }

  fn category_record(&self, category: &models::GameCategory) -> GameCategoryRecord {
    let game_ids = self.games_by_name(|g| g.game_category_id == category.id)
      .into_iter()
      .map(|g| g.id)
      .collect();
    GameCategoryRecord {
      id: category.id,
      name: category.name.clone(),
      game_ids,
    }
  }

  fn game_record(&self, game: &models::Game) -> StoreResult<GameRecord> {
    let category = self.game_categories
      .get(&game.game_category_id)
      .ok_or_else(|| dangling("Game category", game.game_category_id))?;
    let owner = self.users
      .get(&game.owner_id)
      .ok_or_else(|| dangling("User", game.owner_id))?;
    Ok(GameRecord {
      game: game.clone(),
      game_category: category.name.clone(),
      owner: owner.username.clone(),
    })
  }

  fn player_record(&self, player: &models::Player) -> StoreResult<PlayerRecord> {
    let gender = player.gender
      .parse::<Gender>()
      .map_err(|err| StoreError::Backend(err.to_string()))?;
    let mut scores: Vec<_> = self.player_scores.values().filter(|s| s.player_id == player.id).collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    let scores = scores
      .into_iter()
      .map(|score| -> StoreResult<ScoreWithGame> {
        let game = self.games.get(&score.game_id).ok_or_else(|| dangling("Game", score.game_id))?;
        Ok(ScoreWithGame {
          id: score.id,
          score: score.score,
          score_date: score.score_date,
          game: self.game_record(game)?,
        })
      })
      .collect::<StoreResult<Vec<_>>>()?;
    Ok(PlayerRecord {
      id: player.id,
      created: player.created,
      name: player.name.clone(),
      gender,
      scores,
    })
  }

  fn player_score_record(&self, score: &models::PlayerScore) -> StoreResult<PlayerScoreRecord> {
    let player = self.players.get(&score.player_id).ok_or_else(|| dangling("Player", score.player_id))?;
    let game = self.games.get(&score.game_id).ok_or_else(|| dangling("Game", score.game_id))?;
    Ok(PlayerScoreRecord {
      score: score.clone(),
      player: player.name.clone(),
      game: game.name.clone(),
    })
  }

  fn user_record(&self, user: &models::User) -> UserRecord {
    let games = self.games_by_name(|g| g.owner_id == user.id)
      .into_iter()
      .map(|g| GameLink { id: g.id, name: g.name.clone() })
      .collect();
    UserRecord {
      id: user.id,
      username: user.username.clone(),
      games,
    }
  }

  fn compare_games(&self, a: &models::Game, b: &models::Game, ordering: &[GameOrdering]) -> Ordering {
    let default_ordering = [GameOrdering { field: GameOrderField::Name, direction: Direction::Ascending }];
    let ordering = if ordering.is_empty() { &default_ordering[..] } else { ordering };
    ordering
      .iter()
      .fold(Ordering::Equal, |acc, key| {
        acc.then_with(|| {
          let cmp = match key.field {
            GameOrderField::Name => a.name.cmp(&b.name),
            GameOrderField::ReleaseDate => a.release_date.cmp(&b.release_date),
          };
          directed(cmp, key.direction)
        })
      })
      .then(a.id.cmp(&b.id))
  }

  fn game_matches(&self, game: &models::Game, filter: &GameFilter) -> bool {
    if filter.name.as_ref().is_some_and(|name| &game.name != name) {
      return false;
    }
    if let Some(category) = &filter.game_category {
      let matches = self.game_categories
        .get(&game.game_category_id)
        .is_some_and(|c| &c.name == category);
      if !matches {
        return false;
      }
    }
    if filter.release_date.is_some_and(|date| game.release_date != date) {
      return false;
    }
    if filter.played.is_some_and(|played| game.played != played) {
      return false;
    }
    if let Some(owner) = &filter.owner {
      let matches = self.users
        .get(&game.owner_id)
        .is_some_and(|u| &u.username == owner);
      if !matches {
        return false;
      }
    }
    if filter.search.as_ref().is_some_and(|search| !starts_with_ignore_case(&game.name, search)) {
      return false;
    }
    true
  }

  /// Removes a game and the scores recorded in it.
  fn cascade_delete_game(&mut self, id: i32) {
    self.games.remove(&id);
    self.player_scores.retain(|_, score| score.game_id != id);
  }
}

#[rocket::async_trait]
impl Store for MemoryStore {
  async fn list_game_categories(&self, filter: &GameCategoryFilter, page: PageRequest) -> StoreResult<Page<GameCategoryRecord>> {
    let tables = self.lock()?;
    let mut categories: Vec<_> = tables.game_categories
      .values()
      .filter(|c| filter.name.as_ref().map_or(true, |name| &c.name == name))
      .filter(|c| filter.search.as_ref().map_or(true, |search| starts_with_ignore_case(&c.name, search)))
      .collect();
    categories.sort_by(|a, b| directed(a.name.cmp(&b.name), filter.ordering).then(a.id.cmp(&b.id)));
    let records = categories.into_iter().map(|c| tables.category_record(c)).collect();
    Ok(paginate(records, page))
  }

  async fn get_game_category(&self, id: i32) -> StoreResult<Option<GameCategoryRecord>> {
    let tables = self.lock()?;
    Ok(tables.game_categories.get(&id).map(|c| tables.category_record(c)))
  }

  async fn find_game_category_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let tables = self.lock()?;
    Ok(tables.game_categories.values().find(|c| c.name == name).map(|c| c.id))
  }

  async fn create_game_category(&self, new_category: models::NewGameCategory) -> StoreResult<GameCategoryRecord> {
    let mut tables = self.lock()?;
    if tables.category_name_taken(&new_category.name, None) {
      return Err(unique_violation("Game category", &new_category.name));
    }
    let id = tables.game_category_ids.next();
    let category = models::GameCategory { id, name: new_category.name };
    let record = tables.category_record(&category);
    tables.game_categories.insert(id, category);
    Ok(record)
  }

  async fn update_game_category(&self, id: i32, changes: models::GameCategoryChanges) -> StoreResult<GameCategoryRecord> {
    let mut tables = self.lock()?;
    let mut category = tables.game_categories.get(&id).cloned().ok_or(StoreError::NotFound)?;
    if let Some(name) = changes.name {
      if tables.category_name_taken(&name, Some(id)) {
        return Err(unique_violation("Game category", &name));
      }
      category.name = name;
    }
    let record = tables.category_record(&category);
    tables.game_categories.insert(id, category);
    Ok(record)
  }

  async fn delete_game_category(&self, id: i32) -> StoreResult<()> {
    let mut tables = self.lock()?;
    tables.game_categories.remove(&id).ok_or(StoreError::NotFound)?;
    let game_ids: Vec<i32> = tables.games
      .values()
      .filter(|g| g.game_category_id == id)
      .map(|g| g.id)
      .collect();
    for game_id in game_ids {
      tables.cascade_delete_game(game_id);
    }
    Ok(())
  }

  async fn list_games(&self, filter: &GameFilter, page: PageRequest) -> StoreResult<Page<GameRecord>> {
    let tables = self.lock()?;
    let mut games: Vec<_> = tables.games
      .values()
      .filter(|g| tables.game_matches(g, filter))
      .collect();
    games.sort_by(|a, b| tables.compare_games(a, b, &filter.ordering));
    let records = games
      .into_iter()
      .map(|g| tables.game_record(g))
      .collect::<StoreResult<Vec<_>>>()?;
    Ok(paginate(records, page))
  }

  async fn get_game(&self, id: i32) -> StoreResult<Option<GameRecord>> {
    let tables = self.lock()?;
    tables.games.get(&id).map(|g| tables.game_record(g)).transpose()
  }

  async fn find_game_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let tables = self.lock()?;
    Ok(tables.games.values().find(|g| g.name == name).map(|g| g.id))
  }

  async fn create_game(&self, new_game: models::NewGame) -> StoreResult<GameRecord> {
    let mut tables = self.lock()?;
    if tables.game_name_taken(&new_game.name, None) {
      return Err(unique_violation("Game", &new_game.name));
    }
    if !tables.game_categories.contains_key(&new_game.game_category_id) {
      return Err(dangling("Game category", new_game.game_category_id));
    }
    if !tables.users.contains_key(&new_game.owner_id) {
      return Err(dangling("User", new_game.owner_id));
    }
    let id = tables.game_ids.next();
    let game = models::Game {
      id,
      owner_id: new_game.owner_id,
      created: Utc::now(),
      name: new_game.name,
      game_category_id: new_game.game_category_id,
      release_date: new_game.release_date,
      played: new_game.played,
    };
    let record = tables.game_record(&game)?;
    tables.games.insert(id, game);
    Ok(record)
  }

  async fn update_game(&self, id: i32, changes: models::GameChanges) -> StoreResult<GameRecord> {
    let mut tables = self.lock()?;
    let mut game = tables.games.get(&id).cloned().ok_or(StoreError::NotFound)?;
    if let Some(name) = changes.name {
      if tables.game_name_taken(&name, Some(id)) {
        return Err(unique_violation("Game", &name));
      }
      game.name = name;
    }
    if let Some(game_category_id) = changes.game_category_id {
      if !tables.game_categories.contains_key(&game_category_id) {
        return Err(dangling("Game category", game_category_id));
      }
      game.game_category_id = game_category_id;
    }
    if let Some(release_date) = changes.release_date {
      game.release_date = release_date;
    }
    if let Some(played) = changes.played {
      game.played = played;
    }
    let record = tables.game_record(&game)?;
    tables.games.insert(id, game);
    Ok(record)
  }

  async fn delete_game(&self, id: i32) -> StoreResult<()> {
    let mut tables = self.lock()?;
    if !tables.games.contains_key(&id) {
      return Err(StoreError::NotFound);
    }
    tables.cascade_delete_game(id);
    Ok(())
  }

  async fn list_players(&self, filter: &PlayerFilter, page: PageRequest) -> StoreResult<Page<PlayerRecord>> {
    let tables = self.lock()?;
    let mut players: Vec<_> = tables.players
      .values()
      .filter(|p| filter.name.as_ref().map_or(true, |name| &p.name == name))
      .filter(|p| filter.gender.map_or(true, |gender| p.gender == gender.code()))
      .filter(|p| filter.search.as_ref().map_or(true, |search| starts_with_ignore_case(&p.name, search)))
      .collect();
    players.sort_by(|a, b| directed(a.name.cmp(&b.name), filter.ordering).then(a.id.cmp(&b.id)));
    let records = players
      .into_iter()
      .map(|p| tables.player_record(p))
      .collect::<StoreResult<Vec<_>>>()?;
    Ok(paginate(records, page))
  }

  async fn get_player(&self, id: i32) -> StoreResult<Option<PlayerRecord>> {
    let tables = self.lock()?;
    tables.players.get(&id).map(|p| tables.player_record(p)).transpose()
  }

  async fn find_player_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let tables = self.lock()?;
    Ok(tables.players.values().find(|p| p.name == name).map(|p| p.id))
  }

  async fn create_player(&self, new_player: models::NewPlayer) -> StoreResult<PlayerRecord> {
    let mut tables = self.lock()?;
    if tables.player_name_taken(&new_player.name, None) {
      return Err(unique_violation("Player", &new_player.name));
    }
    let id = tables.player_ids.next();
    let player = models::Player {
      id,
      created: Utc::now(),
      name: new_player.name,
      gender: new_player.gender,
    };
    let record = tables.player_record(&player)?;
    tables.players.insert(id, player);
    Ok(record)
  }

  async fn update_player(&self, id: i32, changes: models::PlayerChanges) -> StoreResult<PlayerRecord> {
    let mut tables = self.lock()?;
    let mut player = tables.players.get(&id).cloned().ok_or(StoreError::NotFound)?;
    if let Some(name) = changes.name {
      if tables.player_name_taken(&name, Some(id)) {
        return Err(unique_violation("Player", &name));
      }
      player.name = name;
    }
    if let Some(gender) = changes.gender {
      player.gender = gender;
    }
    let record = tables.player_record(&player)?;
    tables.players.insert(id, player);
    Ok(record)
  }

  async fn delete_player(&self, id: i32) -> StoreResult<()> {
    let mut tables = self.lock()?;
    tables.players.remove(&id).ok_or(StoreError::NotFound)?;
    tables.player_scores.retain(|_, score| score.player_id != id);
    Ok(())
  }

  async fn list_player_scores(&self, page: PageRequest) -> StoreResult<Page<PlayerScoreRecord>> {
    let tables = self.lock()?;
    let mut scores: Vec<_> = tables.player_scores.values().collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    let records = scores
      .into_iter()
      .map(|s| tables.player_score_record(s))
      .collect::<StoreResult<Vec<_>>>()?;
    Ok(paginate(records, page))
  }

  async fn get_player_score(&self, id: i32) -> StoreResult<Option<PlayerScoreRecord>> {
    let tables = self.lock()?;
    tables.player_scores.get(&id).map(|s| tables.player_score_record(s)).transpose()
  }

  async fn create_player_score(&self, new_score: models::NewPlayerScore) -> StoreResult<PlayerScoreRecord> {
    let mut tables = self.lock()?;
    if !tables.players.contains_key(&new_score.player_id) {
      return Err(dangling("Player", new_score.player_id));
    }
    if !tables.games.contains_key(&new_score.game_id) {
      return Err(dangling("Game", new_score.game_id));
    }
    let id = tables.player_score_ids.next();
    let score = models::PlayerScore {
      id,
      player_id: new_score.player_id,
      game_id: new_score.game_id,
      score: new_score.score,
      score_date: new_score.score_date,
    };
    let record = tables.player_score_record(&score)?;
    tables.player_scores.insert(id, score);
    Ok(record)
  }

  async fn update_player_score(&self, id: i32, changes: models::PlayerScoreChanges) -> StoreResult<PlayerScoreRecord> {
    let mut tables = self.lock()?;
    let mut score = tables.player_scores.get(&id).cloned().ok_or(StoreError::NotFound)?;
    if let Some(player_id) = changes.player_id {
      if !tables.players.contains_key(&player_id) {
        return Err(dangling("Player", player_id));
      }
      score.player_id = player_id;
    }
    if let Some(game_id) = changes.game_id {
      if !tables.games.contains_key(&game_id) {
        return Err(dangling("Game", game_id));
      }
      score.game_id = game_id;
    }
    if let Some(value) = changes.score {
      score.score = value;
    }
    if let Some(score_date) = changes.score_date {
      score.score_date = score_date;
    }
    let record = tables.player_score_record(&score)?;
    tables.player_scores.insert(id, score);
    Ok(record)
  }

  async fn delete_player_score(&self, id: i32) -> StoreResult<()> {
    let mut tables = self.lock()?;
    tables.player_scores.remove(&id).ok_or(StoreError::NotFound)?;
    Ok(())
  }

  async fn list_users(&self, page: PageRequest) -> StoreResult<Page<UserRecord>> {
    let tables = self.lock()?;
    let mut users: Vec<_> = tables.users.values().collect();
    users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
    let records = users.into_iter().map(|u| tables.user_record(u)).collect();
    Ok(paginate(records, page))
  }

  async fn get_user(&self, id: i32) -> StoreResult<Option<UserRecord>> {
    let tables = self.lock()?;
    Ok(tables.users.get(&id).map(|u| tables.user_record(u)))
  }

  async fn find_user_by_uuid(&self, user_uuid: &Uuid) -> StoreResult<Option<models::User>> {
    let tables = self.lock()?;
    Ok(tables.users.values().find(|u| &u.user_uuid == user_uuid).cloned())
  }

  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<models::User>> {
    let tables = self.lock()?;
    Ok(tables.users.values().find(|u| u.username == username).cloned())
  }

  async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<models::User>> {
    let tables = self.lock()?;
    Ok(tables.users.values().find(|u| u.api_key.as_deref() == Some(api_key)).cloned())
  }

  async fn create_user(&self, new_user: models::NewUser) -> StoreResult<models::User> {
    let mut tables = self.lock()?;
    if tables.users.values().any(|u| u.username == new_user.username) {
      return Err(StoreError::UniqueViolation(format!("User \"{}\" already exists", new_user.username)));
    }
    let id = tables.user_ids.next();
    let user = models::User {
      id,
      user_uuid: new_user.user_uuid,
      username: new_user.username,
      api_key: new_user.api_key,
    };
    tables.users.insert(id, user.clone());
    Ok(user)
  }
}
