
//! The HTTP layer.
//!
//! [`build_rocket`] reads configuration from Rocket's figment and
//! picks a storage backend. [`build_rocket_with`] takes both
//! explicitly, which is how the test suite runs the server against
//! an in-memory store.

pub mod auth;
pub mod categories;
pub mod config;
pub mod data_access;
pub mod db;
pub mod error;
pub mod games;
pub mod openapi;
pub mod pagination;
pub mod permissions;
pub mod players;
pub mod resolve;
pub mod scores;
pub mod throttle;
pub mod urls;
pub mod users;
pub mod validation;

use auth::{create_jwt_for_api_key, AuthError, Caller, XApiKey};
use config::ApiConfig;
use data_access::{AuthResponse, IndexResponse};
use error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use openapi::ApiDoc;
use throttle::ThrottleHistory;
use urls::BaseUrl;
use crate::store::{PgStore, SharedStore};

use rocket::{Route, Rocket, Build, Ignite, State, routes, get, post};
use rocket::fairing::AdHoc;
use rocket_db_pools::Database;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

/// Where entities are persisted.
#[derive(Clone)]
pub enum Backend {
  /// The `gametracker` PostgreSQL database from Rocket's
  /// configuration.
  Postgres,
  /// A store handed in by the caller, typically a
  /// [`MemoryStore`](crate::store::MemoryStore).
  Custom(SharedStore),
}

pub async fn run_server(backend: Backend) -> anyhow::Result<Rocket<Ignite>> {
  let rocket = build_rocket(backend)?;
  rocket.launch().await.map_err(|err| anyhow::anyhow!("{err}"))
}

pub fn build_rocket(backend: Backend) -> Result<Rocket<Build>, rocket::figment::Error> {
  let figment = rocket::Config::figment();
  let config = ApiConfig::from_figment(&figment)?;
  if config.jwt_secret_key.is_none() {
    log::warn!("No JWT secret key is configured; bearer tokens are disabled");
  }
  let rocket = rocket::custom(figment);
  let rocket = match backend {
    Backend::Postgres => with_postgres(rocket, config),
    Backend::Custom(store) => build_rocket_with(rocket, config, store),
  };
  Ok(rocket)
}

/// Mounts the API on `rocket`, serving entities from `store`.
pub fn build_rocket_with(rocket: Rocket<Build>, config: ApiConfig, store: SharedStore) -> Rocket<Build> {
  mount_api(rocket, config).manage(store)
}

fn with_postgres(rocket: Rocket<Build>, config: ApiConfig) -> Rocket<Build> {
  mount_api(rocket, config)
    .attach(db::Db::init())
    .attach(AdHoc::try_on_ignite("PostgreSQL store", |rocket| async move {
      let Some(db) = db::Db::fetch(&rocket) else {
        return Err(rocket);
      };
      let store: SharedStore = Arc::new(PgStore::new(db.0.clone()));
      Ok(rocket.manage(store))
    }))
}

fn mount_api(rocket: Rocket<Build>, config: ApiConfig) -> Rocket<Build> {
  rocket
    .mount("/", api_routes())
    .mount("/", SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()))
    .register("/", error::catchers())
    .attach(urls::strip_trailing_slash())
    .manage(config)
    .manage(ThrottleHistory::new())
}

pub fn api_routes() -> Vec<Route> {
  let mut api_routes = routes![index, authorize];
  api_routes.extend(categories::routes());
  api_routes.extend(games::routes());
  api_routes.extend(players::routes());
  api_routes.extend(scores::routes());
  api_routes.extend(users::routes());
  api_routes
}

/// Links to every collection in the API.
#[utoipa::path(
  get,
  path="/",
  tag="index",
  responses(
    (status = 200, description = "Collection URLs", body = ApiSuccessResponseBody<IndexResponse>),
  ),
)]
#[get("/")]
async fn index(caller: Result<Caller, ApiError>, urls: BaseUrl) -> Result<ApiSuccessResponse<IndexResponse>, ApiError> {
  caller?;
  Ok(ApiSuccessResponse::new(IndexResponse::new(&urls)))
}

/// Exchanges an API key for a bearer token.
///
/// Takes an API key in the X-Api-Key header and returns a JWT token
/// if successful. The token is valid for the configured token
/// lifetime, one hour by default.
#[utoipa::path(
  post,
  path="/authorize",
  tag="authorization",
  security(("X-Api-Key" = [])),
  responses(
    (status = 200, description = "A JWT token", body = ApiSuccessResponseBody<AuthResponse>),
    (status = 400, description = "Invalid API key"),
  ),
)]
#[post("/authorize")]
async fn authorize(
  api_key: Result<XApiKey<'_>, ApiError>,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
) -> Result<ApiSuccessResponse<AuthResponse>, ApiError> {
  let jwt_token = create_jwt_for_api_key(api_key?.0, store, config).await.map_err(|err| {
    match err {
      AuthError::InvalidApiKey => ApiError::bad_request().with_message("Invalid API key"),
      err => ApiError::internal_server_error(err),
    }
  })?;
  Ok(ApiSuccessResponse::new(AuthResponse { token: jwt_token }))
}
