
//! Player endpoints.

use super::auth::Caller;
use super::config::ApiConfig;
use super::data_access::{PlayerDao, PlayerResponse};
use super::error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use super::pagination::{page_request, paginate, Paginated};
use super::urls::BaseUrl;
use super::validation::{self, WriteMode};
use crate::db::models;
use crate::store::{Direction, Gender, PlayerFilter, SharedStore};

use rocket::{FromForm, Route, State, routes, get, post, put, patch, delete};
use rocket::http::uri::Origin;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::{self, Json};
use utoipa::IntoParams;

pub fn routes() -> Vec<Route> {
  routes![
    list_players,
    create_player,
    get_player,
    replace_player,
    update_player,
    delete_player,
  ]
}

/// Query string of the player listing.
#[derive(Debug, Clone, Default, FromForm, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
  /// Exact player name.
  name: Option<String>,
  /// `M` or `F`.
  gender: Option<String>,
  /// Case-insensitive name prefix.
  search: Option<String>,
  /// `name` or `-name`.
  ordering: Option<String>,
  #[param(value_type = Option<i64>)]
  limit: Option<String>,
  #[param(value_type = Option<i64>)]
  offset: Option<String>,
}

fn player_changes(dao: PlayerDao, mode: WriteMode) -> Result<models::PlayerChanges, ApiError> {
  let name = validation::required("name", dao.name, mode)?
    .map(|name| validation::name("name", &name, validation::PLAYER_NAME_MAX_LENGTH))
    .transpose()?;
  let gender = dao.gender
    .map(|gender| validation::gender("gender", &gender))
    .transpose()?;
  Ok(models::PlayerChanges {
    name,
    gender: gender.map(|gender| gender.code().to_owned()),
  })
}

/// Lists players, each with their scores.
#[utoipa::path(
  get,
  path="/players/",
  tag="player",
  params(PlayerQuery),
  responses(
    (status = 200, description = "A page of players", body = ApiSuccessResponseBody<Paginated<PlayerResponse>>),
    (status = 400, description = "Unknown gender filter"),
  ),
)]
#[get("/players?<query..>")]
pub async fn list_players(
  caller: Result<Caller, ApiError>,
  query: PlayerQuery,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
  urls: BaseUrl,
  uri: &Origin<'_>,
) -> Result<ApiSuccessResponse<Paginated<PlayerResponse>>, ApiError> {
  caller?;
  let filter = PlayerFilter {
    name: query.name,
    gender: query.gender.as_deref().map(|gender| validation::gender("gender", gender)).transpose()?,
    search: validation::search_term(query.search),
    ordering: query.ordering.as_deref().map(|ordering| Direction::for_field(ordering, "name")).unwrap_or_default(),
  };
  let request = page_request(query.limit.as_deref(), query.offset.as_deref(), config);
  let page = store.list_players(&filter, request).await?;
  let page = page.map(|record| PlayerResponse::new(record, &urls));
  Ok(ApiSuccessResponse::new(paginate(page, request, &urls.players(), uri)))
}

/// Creates a player. `gender` defaults to `M`.
#[utoipa::path(
  post,
  path="/players/",
  tag="player",
  request_body = PlayerDao,
  responses(
    (status = 201, description = "Player created", body = ApiSuccessResponseBody<PlayerResponse>),
    (status = 400, description = "Invalid payload"),
  ),
)]
#[post("/players", data = "<body>")]
pub async fn create_player(
  caller: Result<Caller, ApiError>,
  body: Result<Json<PlayerDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<Created<ApiSuccessResponse<PlayerResponse>>, ApiError> {
  caller?;
  let changes = player_changes(body?.into_inner(), WriteMode::Create)?;
  let name = changes.name.ok_or_else(ApiError::bad_request)?;
  let gender = changes.gender.unwrap_or_else(|| Gender::default().code().to_owned());
  let record = store.create_player(models::NewPlayer { name, gender }).await?;
  log::info!("Created player {} ({})", record.id, record.name);
  let response = PlayerResponse::new(record, &urls);
  Ok(Created::new(response.url.clone()).body(ApiSuccessResponse::new(response)))
}

#[utoipa::path(
  get,
  path="/players/{id}/",
  tag="player",
  params(("id" = i32, Path, description = "Player id")),
  responses(
    (status = 200, description = "Player details", body = ApiSuccessResponseBody<PlayerResponse>),
    (status = 404, description = "Player not found"),
  ),
)]
#[get("/players/<id>")]
pub async fn get_player(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerResponse>, ApiError> {
  caller?;
  let record = store.get_player(id).await?.ok_or_else(ApiError::not_found)?;
  Ok(ApiSuccessResponse::new(PlayerResponse::new(record, &urls)))
}

/// Replaces a player. `name` is required.
#[utoipa::path(
  put,
  path="/players/{id}/",
  tag="player",
  params(("id" = i32, Path, description = "Player id")),
  request_body = PlayerDao,
  responses(
    (status = 200, description = "Player updated", body = ApiSuccessResponseBody<PlayerResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 404, description = "Player not found"),
  ),
)]
#[put("/players/<id>", data = "<body>")]
pub async fn replace_player(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<PlayerDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerResponse>, ApiError> {
  caller?;
  write_player(id, body?.into_inner(), WriteMode::Replace, store, &urls).await
}

/// Updates the supplied fields of a player.
#[utoipa::path(
  patch,
  path="/players/{id}/",
  tag="player",
  params(("id" = i32, Path, description = "Player id")),
  request_body = PlayerDao,
  responses(
    (status = 200, description = "Player updated", body = ApiSuccessResponseBody<PlayerResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 404, description = "Player not found"),
  ),
)]
#[patch("/players/<id>", data = "<body>")]
pub async fn update_player(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<PlayerDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<PlayerResponse>, ApiError> {
  caller?;
  write_player(id, body?.into_inner(), WriteMode::Partial, store, &urls).await
}

async fn write_player(
  id: i32,
  dao: PlayerDao,
  mode: WriteMode,
  store: &SharedStore,
  urls: &BaseUrl,
) -> Result<ApiSuccessResponse<PlayerResponse>, ApiError> {
  if store.get_player(id).await?.is_none() {
    return Err(ApiError::not_found());
  }
  let changes = player_changes(dao, mode)?;
  let record = store.update_player(id, changes).await?;
  Ok(ApiSuccessResponse::new(PlayerResponse::new(record, urls)))
}

/// Deletes a player together with their scores.
#[utoipa::path(
  delete,
  path="/players/{id}/",
  tag="player",
  params(("id" = i32, Path, description = "Player id")),
  responses(
    (status = 204, description = "Player deleted"),
    (status = 404, description = "Player not found"),
  ),
)]
#[delete("/players/<id>")]
pub async fn delete_player(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
) -> Result<NoContent, ApiError> {
  caller?;
  store.delete_player(id).await?;
  log::info!("Deleted player {id}");
  Ok(NoContent)
}
