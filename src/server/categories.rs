
//! Game category endpoints. Every request to the collection or to a
//! single category counts against the `game-categories` throttle
//! scope, whatever its method.

use super::auth::Caller;
use super::config::ApiConfig;
use super::data_access::{GameCategoryDao, GameCategoryResponse};
use super::error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use super::pagination::{page_request, paginate, Paginated};
use super::throttle::{GameCategoriesScope, Throttled};
use super::urls::BaseUrl;
use super::validation::{self, WriteMode};
use crate::db::models;
use crate::store::{Direction, GameCategoryFilter, SharedStore};

use rocket::{FromForm, Route, State, routes, get, post, put, patch, delete};
use rocket::http::uri::Origin;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::{self, Json};
use utoipa::IntoParams;

type Throttle = Result<Throttled<GameCategoriesScope>, ApiError>;

pub fn routes() -> Vec<Route> {
  routes![
    list_game_categories,
    create_game_category,
    get_game_category,
    replace_game_category,
    update_game_category,
    delete_game_category,
  ]
}

fn category_changes(dao: GameCategoryDao, mode: WriteMode) -> Result<models::GameCategoryChanges, ApiError> {
  let name = validation::required("name", dao.name, mode)?
    .map(|name| validation::name("name", &name, validation::GAME_CATEGORY_NAME_MAX_LENGTH))
    .transpose()?;
  Ok(models::GameCategoryChanges { name })
}

/// Query string of the game category listing.
#[derive(Debug, Clone, Default, FromForm, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameCategoryQuery {
  /// Exact category name.
  name: Option<String>,
  /// Case-insensitive name prefix.
  search: Option<String>,
  /// `name` or `-name`.
  ordering: Option<String>,
  #[param(value_type = Option<i64>)]
  limit: Option<String>,
  #[param(value_type = Option<i64>)]
  offset: Option<String>,
}

/// Lists game categories.
#[utoipa::path(
  get,
  path="/game-categories/",
  tag="game-category",
  params(GameCategoryQuery),
  responses(
    (status = 200, description = "A page of game categories", body = ApiSuccessResponseBody<Paginated<GameCategoryResponse>>),
    (status = 429, description = "Throttled"),
  ),
)]
#[get("/game-categories?<query..>")]
pub async fn list_game_categories(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  query: GameCategoryQuery,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
  urls: BaseUrl,
  uri: &Origin<'_>,
) -> Result<ApiSuccessResponse<Paginated<GameCategoryResponse>>, ApiError> {
  caller?;
  throttle?;
  let filter = GameCategoryFilter {
    name: query.name,
    search: validation::search_term(query.search),
    ordering: query.ordering.as_deref().map(|ordering| Direction::for_field(ordering, "name")).unwrap_or_default(),
  };
  let request = page_request(query.limit.as_deref(), query.offset.as_deref(), config);
  let page = store.list_game_categories(&filter, request).await?;
  let page = page.map(|record| GameCategoryResponse::new(record, &urls));
  Ok(ApiSuccessResponse::new(paginate(page, request, &urls.game_categories(), uri)))
}

/// Creates a game category.
#[utoipa::path(
  post,
  path="/game-categories/",
  tag="game-category",
  request_body = GameCategoryDao,
  responses(
    (status = 201, description = "Game category created", body = ApiSuccessResponseBody<GameCategoryResponse>),
    (status = 400, description = "Invalid or duplicate name"),
    (status = 429, description = "Throttled"),
  ),
)]
#[post("/game-categories", data = "<body>")]
pub async fn create_game_category(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  body: Result<Json<GameCategoryDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<Created<ApiSuccessResponse<GameCategoryResponse>>, ApiError> {
  caller?;
  throttle?;
  let changes = category_changes(body?.into_inner(), WriteMode::Create)?;
  let name = changes.name.ok_or_else(ApiError::bad_request)?;
  let record = store.create_game_category(models::NewGameCategory { name }).await?;
  log::info!("Created game category {} ({})", record.id, record.name);
  let response = GameCategoryResponse::new(record, &urls);
  Ok(Created::new(response.url.clone()).body(ApiSuccessResponse::new(response)))
}

#[utoipa::path(
  get,
  path="/game-categories/{id}/",
  tag="game-category",
  params(("id" = i32, Path, description = "Game category id")),
  responses(
    (status = 200, description = "Game category details", body = ApiSuccessResponseBody<GameCategoryResponse>),
    (status = 404, description = "Game category not found"),
    (status = 429, description = "Throttled"),
  ),
)]
#[get("/game-categories/<id>")]
pub async fn get_game_category(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  id: i32,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameCategoryResponse>, ApiError> {
  caller?;
  throttle?;
  let record = store.get_game_category(id).await?.ok_or_else(ApiError::not_found)?;
  Ok(ApiSuccessResponse::new(GameCategoryResponse::new(record, &urls)))
}

/// Replaces a game category. `name` is required.
#[utoipa::path(
  put,
  path="/game-categories/{id}/",
  tag="game-category",
  params(("id" = i32, Path, description = "Game category id")),
  request_body = GameCategoryDao,
  responses(
    (status = 200, description = "Game category updated", body = ApiSuccessResponseBody<GameCategoryResponse>),
    (status = 400, description = "Invalid or duplicate name"),
    (status = 404, description = "Game category not found"),
    (status = 429, description = "Throttled"),
  ),
)]
#[put("/game-categories/<id>", data = "<body>")]
pub async fn replace_game_category(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  id: i32,
  body: Result<Json<GameCategoryDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameCategoryResponse>, ApiError> {
  caller?;
  throttle?;
  write_game_category(id, body?.into_inner(), WriteMode::Replace, store, &urls).await
}

/// Updates the supplied fields of a game category.
#[utoipa::path(
  patch,
  path="/game-categories/{id}/",
  tag="game-category",
  params(("id" = i32, Path, description = "Game category id")),
  request_body = GameCategoryDao,
  responses(
    (status = 200, description = "Game category updated", body = ApiSuccessResponseBody<GameCategoryResponse>),
    (status = 400, description = "Invalid or duplicate name"),
    (status = 404, description = "Game category not found"),
    (status = 429, description = "Throttled"),
  ),
)]
#[patch("/game-categories/<id>", data = "<body>")]
pub async fn update_game_category(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  id: i32,
  body: Result<Json<GameCategoryDao>, json::Error<'_>>,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<GameCategoryResponse>, ApiError> {
  caller?;
  throttle?;
  write_game_category(id, body?.into_inner(), WriteMode::Partial, store, &urls).await
}

async fn write_game_category(
  id: i32,
  dao: GameCategoryDao,
  mode: WriteMode,
  store: &SharedStore,
  urls: &BaseUrl,
) -> Result<ApiSuccessResponse<GameCategoryResponse>, ApiError> {
  if store.get_game_category(id).await?.is_none() {
    return Err(ApiError::not_found());
  }
  let changes = category_changes(dao, mode)?;
  let record = store.update_game_category(id, changes).await?;
  Ok(ApiSuccessResponse::new(GameCategoryResponse::new(record, urls)))
}

/// Deletes a game category together with all of its games.
#[utoipa::path(
  delete,
  path="/game-categories/{id}/",
  tag="game-category",
  params(("id" = i32, Path, description = "Game category id")),
  responses(
    (status = 204, description = "Game category deleted"),
    (status = 404, description = "Game category not found"),
    (status = 429, description = "Throttled"),
  ),
)]
#[delete("/game-categories/<id>")]
pub async fn delete_game_category(
  caller: Result<Caller, ApiError>,
  throttle: Throttle,
  id: i32,
  store: &State<SharedStore>,
) -> Result<NoContent, ApiError> {
  caller?;
  throttle?;
  store.delete_game_category(id).await?;
  log::info!("Deleted game category {id}");
  Ok(NoContent)
}
