
//! Player score endpoints.

use super::auth::Caller;
use super::config::ApiConfig;
use super::data_access::{PlayerScoreDao, PlayerScoreResponse};
use super::error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use super::pagination::{paginate, PageQuery, Paginated};
use super::resolve;
use super::urls::BaseUrl;
use super::validation::{self, WriteMode};
use crate::db::models;
use crate::store::SharedStore;

use rocket::{Route, State, routes, get, post, put, patch, delete};
use rocket::http::uri::Origin;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::{self, Json};

pub fn routes() -> Vec<Route> {
  routes![
    list_player_scores,
    create_player_score,
    get_player_score,
    replace_player_score,
    update_player_score,
    delete_player_score,
  ]
}

/// Validates a payload and resolves its player and game names.
async fn score_changes(dao: PlayerScoreDao, mode: WriteMode, store: &SharedStore) -> Result<models::PlayerScoreChanges, ApiError> {
  let player = validation::required("player", dao.player, mode)?;
  let game = validation::required("game", dao.game, mode)?;
  let score = validation::required("score", dao.score, mode)?
    .map(|score| validation::integer("score", &score))
    .transpose()?;
  let score_date = validation::required("score_date", dao.score_date, mode)?
    .map(|score_date| validation::datetime("score_date", &score_date))
    .transpose()?;
  let player_id = match player {
    Some(name) => Some(resolve::player_id(&**store, "player", &name).await?),
    None => None,
  };
  let game_id = match game {
    Some(name) => Some(resolve::game_id(&**store, "game", &name).await?),
    None => None,
  };
  Ok(models::PlayerScoreChanges { player_id, game_id, score, score_date })
}

/// Lists scores, highest first.
#[utoipa::path(
  get,
  path="/player-scores/",
  tag="player-score",
  params(PageQuery),
  responses(
    (status = 200, description = "A page of scores", body = ApiSuccessResponseBody<Paginated<PlayerScoreResponse>>),
  ),
)]
#[get("/player-scores?<query..>")]
pub async fn list_player_scores(
  caller: Result<Caller, ApiError>,
  query: PageQuery,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
  urls: BaseUrl,
  uri: &Origin<'_>,
) -> Result<ApiSuccessResponse<Paginated<PlayerScoreResponse>>, ApiError> {
  caller?;
  let request = query.page_request(config);
  let page = store.list_player_scores(request).await?;
  let page = page.map(|record| PlayerScoreResponse::new(record, &urls));
  Ok(ApiSuccessResponse::new(paginate(page, request, &urls.player_scores(), uri)))
}

/// Records a score. `player` and `game` are names of existing
/// entities.
#[utoipa::path(
  post,
  path="/player-scores/",
  tag="player-score",
  request_body = PlayerScoreDao,
  responses(
    (status = 201, description = "Score created", body = ApiSuccessResponseBody<PlayerScoreResponse>),
    (status = 400, description = "Invalid payload"),
  ),
)]
#[post("/player-scores", data = "<body>")]
pub async fn create_player_score(
  caller: Result<Caller, ApiError>,
  body: Result<Json<PlayerScoreDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<Created<ApiSuccessResponse<PlayerScoreResponse>>, ApiError> {
  caller?;
  let changes = score_changes(body?.into_inner(), WriteMode::Create, store).await?;
  let models::PlayerScoreChanges {
    player_id: Some(player_id),
    game_id: Some(game_id),
    score: Some(score),
    score_date: Some(score_date),
  } = changes else {
    return Err(ApiError::bad_request());
  };
  let record = store.create_player_score(models::NewPlayerScore { player_id, game_id, score, score_date }).await?;
  log::info!("Recorded score {} for {} in {}", record.score.score, record.player, record.game);
  let response = PlayerScoreResponse::new(record, &urls);
  Ok(Created::new(response.url.clone()).body(ApiSuccessResponse::new(response)))
}

#[utoipa::path(
  get,
  path="/player-scores/{id}/",
  tag="player-score",
  params(("id" = i32, Path, description = "Score id")),
  responses(
    (status = 200, description = "Score details", body = ApiSuccessResponseBody<PlayerScoreResponse>),
    (status = 404, description = "Score not found"),
  ),
)]
#[get("/player-scores/<id>")]
pub async fn get_player_score(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerScoreResponse>, ApiError> {
  caller?;
  let record = store.get_player_score(id).await?.ok_or_else(ApiError::not_found)?;
  Ok(ApiSuccessResponse::new(PlayerScoreResponse::new(record, &urls)))
}

/// Replaces a score. Every field is required.
#[utoipa::path(
  put,
  path="/player-scores/{id}/",
  tag="player-score",
  params(("id" = i32, Path, description = "Score id")),
  request_body = PlayerScoreDao,
  responses(
    (status = 200, description = "Score updated", body = ApiSuccessResponseBody<PlayerScoreResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 404, description = "Score not found"),
  ),
)]
#[put("/player-scores/<id>", data = "<body>")]
pub async fn replace_player_score(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<PlayerScoreDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerScoreResponse>, ApiError> {
  caller?;
  write_player_score(id, body?.into_inner(), WriteMode::Replace, store, &urls).await
}

/// Updates the supplied fields of a score.
#[utoipa::path(
  patch,
  path="/player-scores/{id}/",
  tag="player-score",
  params(("id" = i32, Path, description = "Score id")),
  request_body = PlayerScoreDao,
  responses(
    (status = 200, description = "Score updated", body = ApiSuccessResponseBody<PlayerScoreResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 404, description = "Score not found"),
  ),
)]
#[patch("/player-scores/<id>", data = "<body>")]
pub async fn update_player_score(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<PlayerScoreDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerScoreResponse>, ApiError> {
  caller?;
  write_player_score(id, body?.into_inner(), WriteMode::Partial, store, &urls).await
}

async fn write_player_score(
  id: i32,
  dao: PlayerScoreDao,
  mode: WriteMode,
  store: &SharedStore,
  urls: &BaseUrl,
) -> Result<ApiSuccessResponse<PlayerScoreResponse>, ApiError> {
  if store.get_player_score(id).await?.is_none() {
    return Err(ApiError::not_found());
  }
  let changes = score_changes(dao, mode, store).await?;
  let record = store.update_player_score(id, changes).await?;
  Ok(ApiSuccessResponse::new(PlayerScoreResponse::new(record, urls)))
}

#[utoipa::path(
  delete,
  path="/player-scores/{id}/",
  tag="player-score",
  params(("id" = i32, Path, description = "Score id")),
  responses(
    (status = 204, description = "Score deleted"),
    (status = 404, description = "Score not found"),
  ),
)]
#[delete("/player-scores/<id>")]
pub async fn delete_player_score(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
) -> Result<NoContent, ApiError> {
  caller?;
  store.delete_player_score(id).await?;
  Ok(NoContent)
}
