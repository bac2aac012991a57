
//! Game endpoints. Anyone may read games, but only authenticated
//! users may create them and only a game's owner may change it.

use super::auth::Caller;
use super::config::ApiConfig;
use super::data_access::{GameDao, GameResponse};
use super::error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use super::pagination::{page_request, paginate, Paginated};
use super::permissions::UserOwnedExt;
use super::resolve;
use super::urls::BaseUrl;
use super::validation::{self, WriteMode};
use crate::db::models;
use crate::store::{GameFilter, GameOrdering, SharedStore};

use rocket::{FromForm, Route, State, routes, get, post, put, patch, delete};
use rocket::http::Method;
use rocket::http::uri::Origin;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::{self, Json};
use utoipa::IntoParams;

pub fn routes() -> Vec<Route> {
  routes![
    list_games,
    create_game,
    get_game,
    replace_game,
    update_game,
    delete_game,
  ]
}

/// Query string of the game listing.
#[derive(Debug, Clone, Default, FromForm, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameQuery {
  /// Exact game name.
  name: Option<String>,
  /// Exact category name.
  game_category: Option<String>,
  /// Exact release timestamp, RFC 3339.
  release_date: Option<String>,
  #[param(value_type = Option<bool>)]
  played: Option<String>,
  /// Exact owner username.
  owner: Option<String>,
  /// Case-insensitive name prefix.
  search: Option<String>,
  /// Comma-separated list of `name`, `-name`, `release_date` and
  /// `-release_date`.
  ordering: Option<String>,
  #[param(value_type = Option<i64>)]
  limit: Option<String>,
  #[param(value_type = Option<i64>)]
  offset: Option<String>,
}

impl GameQuery {
  fn filter(&self) -> Result<GameFilter, ApiError> {
    let release_date = self.release_date.as_deref()
      .map(|release_date| validation::datetime("release_date", release_date))
      .transpose()?;
    let played = self.played.as_deref()
      .map(|played| {
        validation::parse_bool(played)
          .ok_or_else(|| ApiError::invalid_field("played", "Must be a valid boolean."))
      })
      .transpose()?;
    Ok(GameFilter {
      name: self.name.clone(),
      game_category: self.game_category.clone(),
      release_date,
      played,
      owner: self.owner.clone(),
      search: validation::search_term(self.search.clone()),
      ordering: self.ordering.as_deref().map(GameOrdering::parse_list).unwrap_or_default(),
    })
  }
}

/// Validates a payload and resolves its category name.
async fn game_changes(dao: GameDao, mode: WriteMode, store: &SharedStore) -> Result<models::GameChanges, ApiError> {
  let name = validation::required("name", dao.name, mode)?
    .map(|name| validation::name("name", &name, validation::GAME_NAME_MAX_LENGTH))
    .transpose()?;
  let game_category = validation::required("game_category", dao.game_category, mode)?;
  let release_date = validation::required("release_date", dao.release_date, mode)?
    .map(|release_date| validation::datetime("release_date", &release_date))
    .transpose()?;
  let played = dao.played
    .map(|played| validation::boolean("played", &played))
    .transpose()?;
  let game_category_id = match game_category {
    Some(name) => Some(resolve::game_category_id(&**store, "game_category", &name).await?),
    None => None,
  };
  Ok(models::GameChanges { name, game_category_id, release_date, played })
}

/// Lists games.
#[utoipa::path(
  get,
  path="/games/",
  tag="game",
  params(GameQuery),
  responses(
    (status = 200, description = "A page of games", body = ApiSuccessResponseBody<Paginated<GameResponse>>),
    (status = 400, description = "Unparsable filter value"),
  ),
)]
#[get("/games?<query..>")]
pub async fn list_games(
  caller: Result<Caller, ApiError>,
  query: GameQuery,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
  urls: BaseUrl,
  uri: &Origin<'_>,
) -> Result<ApiSuccessResponse<Paginated<GameResponse>>, ApiError> {
  caller?;
  let filter = query.filter()?;
  let request = page_request(query.limit.as_deref(), query.offset.as_deref(), config);
  let page = store.list_games(&filter, request).await?;
  let page = page.map(|record| GameResponse::new(record, &urls));
  Ok(ApiSuccessResponse::new(paginate(page, request, &urls.games(), uri)))
}

/// Creates a game owned by the requesting user.
///
/// The owner is always the authenticated caller. Any `owner` in the
/// request body is ignored.
#[utoipa::path(
  post,
  path="/games/",
  tag="game",
  request_body = GameDao,
  responses(
    (status = 201, description = "Game created", body = ApiSuccessResponseBody<GameResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 401, description = "Not authenticated"),
  ),
)]
#[post("/games", data = "<body>")]
pub async fn create_game(
  caller: Result<Caller, ApiError>,
  body: Result<Json<GameDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<Created<ApiSuccessResponse<GameResponse>>, ApiError> {
  let caller = caller?;
  let requesting_user = caller.require_user()?;
  let changes = game_changes(body?.into_inner(), WriteMode::Create, store).await?;
  let (Some(name), Some(game_category_id), Some(release_date)) = (changes.name, changes.game_category_id, changes.release_date) else {
    return Err(ApiError::bad_request());
  };
  let new_game = models::NewGame {
    owner_id: requesting_user.id,
    name,
    game_category_id,
    release_date,
    played: changes.played.unwrap_or(false),
  };
  let record = store.create_game(new_game).await?;
  log::info!("User {} created game {} ({})", requesting_user.username, record.id(), record.game.name);
  let response = GameResponse::new(record, &urls);
  Ok(Created::new(response.url.clone()).body(ApiSuccessResponse::new(response)))
}

#[utoipa::path(
  get,
  path="/games/{id}/",
  tag="game",
  params(("id" = i32, Path, description = "Game id")),
  responses(
    (status = 200, description = "Game details", body = ApiSuccessResponseBody<GameResponse>),
    (status = 404, description = "Game not found"),
  ),
)]
#[get("/games/<id>")]
pub async fn get_game(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameResponse>, ApiError> {
  caller?;
  let record = store.get_game(id).await?.ok_or_else(ApiError::not_found)?;
  Ok(ApiSuccessResponse::new(GameResponse::new(record, &urls)))
}

/// Replaces a game. Only the owner may do this.
#[utoipa::path(
  put,
  path="/games/{id}/",
  tag="game",
  params(("id" = i32, Path, description = "Game id")),
  request_body = GameDao,
  responses(
    (status = 200, description = "Game updated", body = ApiSuccessResponseBody<GameResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 401, description = "Not authenticated"),
    (status = 403, description = "Not the owner"),
    (status = 404, description = "Game not found"),
  ),
)]
#[put("/games/<id>", data = "<body>")]
pub async fn replace_game(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<GameDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameResponse>, ApiError> {
  write_game(caller?, Method::Put, id, body, WriteMode::Replace, store, &urls).await
}

/// Updates the supplied fields of a game. Only the owner may do this.
#[utoipa::path(
  patch,
  path="/games/{id}/",
  tag="game",
  params(("id" = i32, Path, description = "Game id")),
  request_body = GameDao,
  responses(
    (status = 200, description = "Game updated", body = ApiSuccessResponseBody<GameResponse>),
    (status = 400, description = "Invalid payload"),
    (status = 401, description = "Not authenticated"),
    (status = 403, description = "Not the owner"),
    (status = 404, description = "Game not found"),
  ),
)]
#[patch("/games/<id>", data = "<body>")]
pub async fn update_game(
  caller: Result<Caller, ApiError>,
  id: i32,
  body: Result<Json<GameDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameResponse>, ApiError> {
  write_game(caller?, Method::Patch, id, body, WriteMode::Partial, store, &urls).await
}

async fn write_game(
  caller: Caller,
  method: Method,
  id: i32,
  body: Result<Json<GameDao>, json::Error<'_>>,
  mode: WriteMode,
  store: &SharedStore,
  urls: &BaseUrl,
) -> Result<ApiSuccessResponse<GameResponse>, ApiError> {
  let requesting_user = caller.require_user()?;
  store.get_game(id).await?.check_permission(method, requesting_user)?;
  let changes = game_changes(body?.into_inner(), mode, store).await?;
  let record = store.update_game(id, changes).await?;
  Ok(ApiSuccessResponse::new(GameResponse::new(record, urls)))
}

/// Deletes a game and every score recorded in it. Only the owner
/// may do this.
#[utoipa::path(
  delete,
  path="/games/{id}/",
  tag="game",
  params(("id" = i32, Path, description = "Game id")),
  responses(
    (status = 204, description = "Game deleted"),
    (status = 401, description = "Not authenticated"),
    (status = 403, description = "Not the owner"),
    (status = 404, description = "Game not found"),
  ),
)]
#[delete("/games/<id>")]
pub async fn delete_game(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
) -> Result<NoContent, ApiError> {
  let caller = caller?;
  let requesting_user = caller.require_user()?;
  store.get_game(id).await?.check_permission(Method::Delete, requesting_user)?;
  store.delete_game(id).await?;
  log::info!("User {} deleted game {id}", requesting_user.username);
  Ok(NoContent)
}
