
//! PostgreSQL [`Store`] backend built on Diesel.
//!
//! Listings are loaded in two steps: the filtered page of rows, then
//! one query per relation to fill in related names and nested
//! entities for that page.

use super::query::{escape_like, Direction, GameOrderField};
use super::{
  GameCategoryFilter, GameCategoryRecord, GameFilter, GameLink, GameRecord, Gender, Page,
  PageRequest, PlayerFilter, PlayerRecord, PlayerScoreRecord, ScoreWithGame, Store, StoreError,
  StoreResult, UserRecord,
};
use crate::db::models;
use crate::db::schema::{game_categories, games, player_scores, players, users};

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rocket_db_pools::diesel::PgPool;
use scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use std::collections::HashMap;
use std::ops::DerefMut;

const UNKNOWN_DB_ERROR: &str = "An unexpected database error occurred";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn connection(&self) -> StoreResult<impl DerefMut<Target = AsyncPgConnection> + Send> {
    self.pool.get().await.map_err(|err| {
      log::error!("Could not check out a database connection: {err}");
      StoreError::Backend(String::from(UNKNOWN_DB_ERROR))
    })
  }
}

impl From<DieselError> for StoreError {
  fn from(err: DieselError) -> StoreError {
    match err {
      DieselError::NotFound => StoreError::NotFound,
      DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) =>
        StoreError::UniqueViolation(info.message().to_owned()),
      DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) =>
        StoreError::ForeignKeyViolation(info.message().to_owned()),
      err => {
        log::error!("Database error: {err}");
        StoreError::Backend(String::from(UNKNOWN_DB_ERROR))
      }
    }
  }
}

fn single<T>(mut records: Vec<T>) -> StoreResult<T> {
  records.pop().ok_or(StoreError::NotFound)
}

fn prefix_pattern(search: &str) -> String {
  format!("{}%", escape_like(search))
}

fn missing_relation(what: &str, id: i32) -> StoreError {
  log::error!("{what} {id} vanished while loading related rows");
  StoreError::Backend(String::from(UNKNOWN_DB_ERROR))
}

fn filtered_game_categories(filter: &GameCategoryFilter) -> game_categories::BoxedQuery<'static, Pg> {
  let mut query = game_categories::table.into_boxed();
  if let Some(name) = &filter.name {
    query = query.filter(game_categories::name.eq(name.clone()));
  }
  if let Some(search) = &filter.search {
    query = query.filter(game_categories::name.ilike(prefix_pattern(search)));
  }
  query
}

fn filtered_games(filter: &GameFilter) -> games::BoxedQuery<'static, Pg> {
  let mut query = games::table.into_boxed();
  if let Some(name) = &filter.name {
    query = query.filter(games::name.eq(name.clone()));
  }
  if let Some(category) = &filter.game_category {
    let category_ids = game_categories::table
      .filter(game_categories::name.eq(category.clone()))
      .select(game_categories::id);
    query = query.filter(games::game_category_id.eq_any(category_ids));
  }
  if let Some(release_date) = filter.release_date {
    query = query.filter(games::release_date.eq(release_date));
  }
  if let Some(played) = filter.played {
    query = query.filter(games::played.eq(played));
  }
  if let Some(owner) = &filter.owner {
    let owner_ids = users::table
      .filter(users::username.eq(owner.clone()))
      .select(users::id);
    query = query.filter(games::owner_id.eq_any(owner_ids));
  }
  if let Some(search) = &filter.search {
    query = query.filter(games::name.ilike(prefix_pattern(search)));
  }
  query
}

fn filtered_players(filter: &PlayerFilter) -> players::BoxedQuery<'static, Pg> {
  let mut query = players::table.into_boxed();
  if let Some(name) = &filter.name {
    query = query.filter(players::name.eq(name.clone()));
  }
  if let Some(gender) = filter.gender {
    query = query.filter(players::gender.eq(gender.code()));
  }
  if let Some(search) = &filter.search {
    query = query.filter(players::name.ilike(prefix_pattern(search)));
  }
  query
}

async fn game_category_records(
  conn: &mut AsyncPgConnection,
  categories: Vec<models::GameCategory>,
) -> StoreResult<Vec<GameCategoryRecord>> {
  if categories.is_empty() {
    return Ok(Vec::new());
  }
  let ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
  let pairs = games::table
    .filter(games::game_category_id.eq_any(ids))
    .order((games::name.asc(), games::id.asc()))
    .select((games::game_category_id, games::id))
    .load::<(i32, i32)>(conn)
    .await?;
  let mut game_ids: HashMap<i32, Vec<i32>> = HashMap::new();
  for (category_id, game_id) in pairs {
    game_ids.entry(category_id).or_default().push(game_id);
  }
  let records = categories
    .into_iter()
    .map(|category| GameCategoryRecord {
      game_ids: game_ids.remove(&category.id).unwrap_or_default(),
      id: category.id,
      name: category.name,
    })
    .collect();
  Ok(records)
}

async fn game_records(conn: &mut AsyncPgConnection, rows: Vec<models::Game>) -> StoreResult<Vec<GameRecord>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let category_ids: Vec<i32> = rows.iter().map(|g| g.game_category_id).collect();
  let owner_ids: Vec<i32> = rows.iter().map(|g| g.owner_id).collect();
  let category_names: HashMap<i32, String> = game_categories::table
    .filter(game_categories::id.eq_any(category_ids))
    .select((game_categories::id, game_categories::name))
    .load::<(i32, String)>(conn)
    .await?
    .into_iter()
    .collect();
  let usernames: HashMap<i32, String> = users::table
    .filter(users::id.eq_any(owner_ids))
    .select((users::id, users::username))
    .load::<(i32, String)>(conn)
    .await?
    .into_iter()
    .collect();
  rows
    .into_iter()
    .map(|game| {
      let game_category = category_names
        .get(&game.game_category_id)
        .cloned()
        .ok_or_else(|| missing_relation("Game category", game.game_category_id))?;
      let owner = usernames
        .get(&game.owner_id)
        .cloned()
        .ok_or_else(|| missing_relation("User", game.owner_id))?;
      Ok(GameRecord { game, game_category, owner })
    })
    .collect()
}

async fn player_records(conn: &mut AsyncPgConnection, rows: Vec<models::Player>) -> StoreResult<Vec<PlayerRecord>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let player_ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
  let scores = player_scores::table
    .filter(player_scores::player_id.eq_any(player_ids))
    .order((player_scores::score.desc(), player_scores::id.asc()))
    .load::<models::PlayerScore>(conn)
    .await?;
  let game_ids: Vec<i32> = scores.iter().map(|s| s.game_id).collect();
  let score_games = games::table
    .filter(games::id.eq_any(game_ids))
    .load::<models::Game>(conn)
    .await?;
  let score_games: HashMap<i32, GameRecord> = game_records(conn, score_games)
    .await?
    .into_iter()
    .map(|record| (record.id(), record))
    .collect();

  let mut scores_by_player: HashMap<i32, Vec<ScoreWithGame>> = HashMap::new();
  for score in scores {
    let game = score_games
      .get(&score.game_id)
      .cloned()
      .ok_or_else(|| missing_relation("Game", score.game_id))?;
    scores_by_player.entry(score.player_id).or_default().push(ScoreWithGame {
      id: score.id,
      score: score.score,
      score_date: score.score_date,
      game,
    });
  }

  rows
    .into_iter()
    .map(|player| {
      let gender = player.gender
        .parse::<Gender>()
        .map_err(|err| StoreError::Backend(err.to_string()))?;
      Ok(PlayerRecord {
        scores: scores_by_player.remove(&player.id).unwrap_or_default(),
        id: player.id,
        created: player.created,
        name: player.name,
        gender,
      })
    })
    .collect()
}

async fn player_score_records(
  conn: &mut AsyncPgConnection,
  rows: Vec<models::PlayerScore>,
) -> StoreResult<Vec<PlayerScoreRecord>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let player_ids: Vec<i32> = rows.iter().map(|s| s.player_id).collect();
  let game_ids: Vec<i32> = rows.iter().map(|s| s.game_id).collect();
  let player_names: HashMap<i32, String> = players::table
    .filter(players::id.eq_any(player_ids))
    .select((players::id, players::name))
    .load::<(i32, String)>(conn)
    .await?
    .into_iter()
    .collect();
  let game_names: HashMap<i32, String> = games::table
    .filter(games::id.eq_any(game_ids))
    .select((games::id, games::name))
    .load::<(i32, String)>(conn)
    .await?
    .into_iter()
    .collect();
  rows
    .into_iter()
    .map(|score| {
      let player = player_names
        .get(&score.player_id)
        .cloned()
        .ok_or_else(|| missing_relation("Player", score.player_id))?;
      let game = game_names
        .get(&score.game_id)
        .cloned()
        .ok_or_else(|| missing_relation("Game", score.game_id))?;
      Ok(PlayerScoreRecord { score, player, game })
    })
    .collect()
}

async fn user_records(conn: &mut AsyncPgConnection, rows: Vec<models::User>) -> StoreResult<Vec<UserRecord>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let user_ids: Vec<i32> = rows.iter().map(|u| u.id).collect();
  let owned = games::table
    .filter(games::owner_id.eq_any(user_ids))
    .order((games::name.asc(), games::id.asc()))
    .select((games::owner_id, games::id, games::name))
    .load::<(i32, i32, String)>(conn)
    .await?;
  let mut games_by_owner: HashMap<i32, Vec<GameLink>> = HashMap::new();
  for (owner_id, id, name) in owned {
    games_by_owner.entry(owner_id).or_default().push(GameLink { id, name });
  }
  let records = rows
    .into_iter()
    .map(|user| UserRecord {
      games: games_by_owner.remove(&user.id).unwrap_or_default(),
      id: user.id,
      username: user.username,
    })
    .collect();
  Ok(records)
}

fn deleted(rows: usize) -> StoreResult<()> {
  if rows == 0 {
    Err(StoreError::NotFound)
  } else {
    Ok(())
  }
}

#[rocket::async_trait]
impl Store for PgStore {
  async fn list_game_categories(&self, filter: &GameCategoryFilter, page: PageRequest) -> StoreResult<Page<GameCategoryRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let count = filtered_game_categories(filter).count().get_result::<i64>(conn).await?;
    let query = match filter.ordering {
      Direction::Ascending => filtered_game_categories(filter).order(game_categories::name.asc()),
      Direction::Descending => filtered_game_categories(filter).order(game_categories::name.desc()),
    };
    let rows = query
      .then_order_by(game_categories::id.asc())
      .limit(page.limit)
      .offset(page.offset)
      .load::<models::GameCategory>(conn)
      .await?;
    let items = game_category_records(conn, rows).await?;
    Ok(Page { count, items })
  }

  async fn get_game_category(&self, id: i32) -> StoreResult<Option<GameCategoryRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let row = game_categories::table
      .find(id)
      .first::<models::GameCategory>(conn)
      .await
      .optional()?;
    let records = game_category_records(conn, row.into_iter().collect()).await?;
    Ok(records.into_iter().next())
  }

  async fn find_game_category_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let mut conn = self.connection().await?;
    let id = game_categories::table
      .filter(game_categories::name.eq(name))
      .select(game_categories::id)
      .first::<i32>(&mut *conn)
      .await
      .optional()?;
    Ok(id)
  }

  async fn create_game_category(&self, new_category: models::NewGameCategory) -> StoreResult<GameCategoryRecord> {
    let mut conn = self.connection().await?;
    let category = diesel::insert_into(game_categories::table)
      .values(&new_category)
      .returning(models::GameCategory::as_returning())
      .get_result::<models::GameCategory>(&mut *conn)
      .await?;
    Ok(GameCategoryRecord {
      id: category.id,
      name: category.name,
      game_ids: Vec::new(),
    })
  }

  async fn update_game_category(&self, id: i32, changes: models::GameCategoryChanges) -> StoreResult<GameCategoryRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let category = if changes.is_empty() {
        game_categories::table.find(id).first::<models::GameCategory>(conn).await?
      } else {
        diesel::update(game_categories::table.find(id))
          .set(&changes)
          .returning(models::GameCategory::as_returning())
          .get_result::<models::GameCategory>(conn)
          .await?
      };
      single(game_category_records(conn, vec![category]).await?)
    }.scope_boxed()).await
  }

  async fn delete_game_category(&self, id: i32) -> StoreResult<()> {
    let mut conn = self.connection().await?;
    let rows = diesel::delete(game_categories::table.find(id))
      .execute(&mut *conn)
      .await?;
    deleted(rows)
  }

  async fn list_games(&self, filter: &GameFilter, page: PageRequest) -> StoreResult<Page<GameRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let count = filtered_games(filter).count().get_result::<i64>(conn).await?;
    let mut query = filtered_games(filter);
    if filter.ordering.is_empty() {
      query = query.then_order_by(games::name.asc());
    }
    for key in &filter.ordering {
      query = match (key.field, key.direction) {
        (GameOrderField::Name, Direction::Ascending) => query.then_order_by(games::name.asc()),
        (GameOrderField::Name, Direction::Descending) => query.then_order_by(games::name.desc()),
        (GameOrderField::ReleaseDate, Direction::Ascending) => query.then_order_by(games::release_date.asc()),
        (GameOrderField::ReleaseDate, Direction::Descending) => query.then_order_by(games::release_date.desc()),
      };
    }
    let rows = query
      .then_order_by(games::id.asc())
      .limit(page.limit)
      .offset(page.offset)
      .load::<models::Game>(conn)
      .await?;
    let items = game_records(conn, rows).await?;
    Ok(Page { count, items })
  }

  async fn get_game(&self, id: i32) -> StoreResult<Option<GameRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let row = games::table
      .find(id)
      .first::<models::Game>(conn)
      .await
      .optional()?;
    let records = game_records(conn, row.into_iter().collect()).await?;
    Ok(records.into_iter().next())
  }

  async fn find_game_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let mut conn = self.connection().await?;
    let id = games::table
      .filter(games::name.eq(name))
      .select(games::id)
      .first::<i32>(&mut *conn)
      .await
      .optional()?;
    Ok(id)
  }

  async fn create_game(&self, new_game: models::NewGame) -> StoreResult<GameRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let game = diesel::insert_into(games::table)
        .values(&new_game)
        .returning(models::Game::as_returning())
        .get_result::<models::Game>(conn)
        .await?;
      single(game_records(conn, vec![game]).await?)
    }.scope_boxed()).await
  }

  async fn update_game(&self, id: i32, changes: models::GameChanges) -> StoreResult<GameRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let game = if changes.is_empty() {
        games::table.find(id).first::<models::Game>(conn).await?
      } else {
        diesel::update(games::table.find(id))
          .set(&changes)
          .returning(models::Game::as_returning())
          .get_result::<models::Game>(conn)
          .await?
      };
      single(game_records(conn, vec![game]).await?)
    }.scope_boxed()).await
  }

  async fn delete_game(&self, id: i32) -> StoreResult<()> {
    let mut conn = self.connection().await?;
    let rows = diesel::delete(games::table.find(id))
      .execute(&mut *conn)
      .await?;
    deleted(rows)
  }

  async fn list_players(&self, filter: &PlayerFilter, page: PageRequest) -> StoreResult<Page<PlayerRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let count = filtered_players(filter).count().get_result::<i64>(conn).await?;
    let query = match filter.ordering {
      Direction::Ascending => filtered_players(filter).order(players::name.asc()),
      Direction::Descending => filtered_players(filter).order(players::name.desc()),
    };
    let rows = query
      .then_order_by(players::id.asc())
      .limit(page.limit)
      .offset(page.offset)
      .load::<models::Player>(conn)
      .await?;
    let items = player_records(conn, rows).await?;
    Ok(Page { count, items })
  }

  async fn get_player(&self, id: i32) -> StoreResult<Option<PlayerRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let row = players::table
      .find(id)
      .first::<models::Player>(conn)
      .await
      .optional()?;
    let records = player_records(conn, row.into_iter().collect()).await?;
    Ok(records.into_iter().next())
  }

  async fn find_player_id(&self, name: &str) -> StoreResult<Option<i32>> {
    let mut conn = self.connection().await?;
    let id = players::table
      .filter(players::name.eq(name))
      .select(players::id)
      .first::<i32>(&mut *conn)
      .await
      .optional()?;
    Ok(id)
  }

  async fn create_player(&self, new_player: models::NewPlayer) -> StoreResult<PlayerRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let player = diesel::insert_into(players::table)
        .values(&new_player)
        .returning(models::Player::as_returning())
        .get_result::<models::Player>(conn)
        .await?;
      single(player_records(conn, vec![player]).await?)
    }.scope_boxed()).await
  }

  async fn update_player(&self, id: i32, changes: models::PlayerChanges) -> StoreResult<PlayerRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let player = if changes.is_empty() {
        players::table.find(id).first::<models::Player>(conn).await?
      } else {
        diesel::update(players::table.find(id))
          .set(&changes)
          .returning(models::Player::as_returning())
          .get_result::<models::Player>(conn)
          .await?
      };
      single(player_records(conn, vec![player]).await?)
    }.scope_boxed()).await
  }

  async fn delete_player(&self, id: i32) -> StoreResult<()> {
    let mut conn = self.connection().await?;
    let rows = diesel::delete(players::table.find(id))
      .execute(&mut *conn)
      .await?;
    deleted(rows)
  }

  async fn list_player_scores(&self, page: PageRequest) -> StoreResult<Page<PlayerScoreRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let count = player_scores::table.count().get_result::<i64>(conn).await?;
    let rows = player_scores::table
      .order((player_scores::score.desc(), player_scores::id.asc()))
      .limit(page.limit)
      .offset(page.offset)
      .load::<models::PlayerScore>(conn)
      .await?;
    let items = player_score_records(conn, rows).await?;
    Ok(Page { count, items })
  }

  async fn get_player_score(&self, id: i32) -> StoreResult<Option<PlayerScoreRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let row = player_scores::table
      .find(id)
      .first::<models::PlayerScore>(conn)
      .await
      .optional()?;
    let records = player_score_records(conn, row.into_iter().collect()).await?;
    Ok(records.into_iter().next())
  }

  async fn create_player_score(&self, new_score: models::NewPlayerScore) -> StoreResult<PlayerScoreRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let score = diesel::insert_into(player_scores::table)
        .values(&new_score)
        .returning(models::PlayerScore::as_returning())
        .get_result::<models::PlayerScore>(conn)
        .await?;
      single(player_score_records(conn, vec![score]).await?)
    }.scope_boxed()).await
  }

  async fn update_player_score(&self, id: i32, changes: models::PlayerScoreChanges) -> StoreResult<PlayerScoreRecord> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    conn.transaction::<_, StoreError, _>(|conn| async move {
      let score = if changes.is_empty() {
        player_scores::table.find(id).first::<models::PlayerScore>(conn).await?
      } else {
        diesel::update(player_scores::table.find(id))
          .set(&changes)
          .returning(models::PlayerScore::as_returning())
          .get_result::<models::PlayerScore>(conn)
          .await?
      };
      single(player_score_records(conn, vec![score]).await?)
    }.scope_boxed()).await
  }

  async fn delete_player_score(&self, id: i32) -> StoreResult<()> {
    let mut conn = self.connection().await?;
    let rows = diesel::delete(player_scores::table.find(id))
      .execute(&mut *conn)
      .await?;
    deleted(rows)
  }

  async fn list_users(&self, page: PageRequest) -> StoreResult<Page<UserRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let count = users::table.count().get_result::<i64>(conn).await?;
    let rows = users::table
      .order((users::username.asc(), users::id.asc()))
      .limit(page.limit)
      .offset(page.offset)
      .load::<models::User>(conn)
      .await?;
    let items = user_records(conn, rows).await?;
    Ok(Page { count, items })
  }

  async fn get_user(&self, id: i32) -> StoreResult<Option<UserRecord>> {
    let mut conn = self.connection().await?;
    let conn = &mut *conn;
    let row = users::table
      .find(id)
      .first::<models::User>(conn)
      .await
      .optional()?;
    let records = user_records(conn, row.into_iter().collect()).await?;
    Ok(records.into_iter().next())
  }

  async fn find_user_by_uuid(&self, user_uuid: &Uuid) -> StoreResult<Option<models::User>> {
    let mut conn = self.connection().await?;
    let user = users::table
      .filter(users::user_uuid.eq(*user_uuid))
      .first::<models::User>(&mut *conn)
      .await
      .optional()?;
    Ok(user)
  }

  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<models::User>> {
    let mut conn = self.connection().await?;
    let user = users::table
      .filter(users::username.eq(username))
      .first::<models::User>(&mut *conn)
      .await
      .optional()?;
    Ok(user)
  }

  async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<models::User>> {
    let mut conn = self.connection().await?;
    let user = users::table
      .filter(users::api_key.eq(api_key))
      .first::<models::User>(&mut *conn)
      .await
      .optional()?;
    Ok(user)
  }

  async fn create_user(&self, new_user: models::NewUser) -> StoreResult<models::User> {
    let mut conn = self.connection().await?;
    let user = diesel::insert_into(users::table)
      .values(&new_user)
      .returning(models::User::as_returning())
      .get_result::<models::User>(&mut *conn)
      .await?;
    Ok(user)
  }
}
