
//! Read-only user endpoints. Users are created from the command line.

use super::auth::Caller;
use super::config::ApiConfig;
use super::data_access::UserResponse;
use super::error::{ApiError, ApiSuccessResponse, ApiSuccessResponseBody};
use super::pagination::{paginate, PageQuery, Paginated};
use super::urls::BaseUrl;
use crate::store::SharedStore;

use rocket::{Route, State, routes, get};
use rocket::http::uri::Origin;

pub fn routes() -> Vec<Route> {
  routes![list_users, get_user]
}

/// Lists users by username, each with the games they own.
#[utoipa::path(
  get,
  path="/users/",
  tag="user",
  params(PageQuery),
  responses(
    (status = 200, description = "A page of users", body = ApiSuccessResponseBody<Paginated<UserResponse>>),
  ),
)]
#[get("/users?<query..>")]
pub async fn list_users(
  caller: Result<Caller, ApiError>,
  query: PageQuery,
  store: &State<SharedStore>,
  config: &State<ApiConfig>,
  urls: BaseUrl,
  uri: &Origin<'_>,
) -> Result<ApiSuccessResponse<Paginated<UserResponse>>, ApiError> {
  caller?;
  let request = query.page_request(config);
  let page = store.list_users(request).await?;
  let page = page.map(|record| UserResponse::new(record, &urls));
  Ok(ApiSuccessResponse::new(paginate(page, request, &urls.users(), uri)))
}

#[utoipa::path(
  get,
  path="/users/{id}/",
  tag="user",
  params(("id" = i32, Path, description = "User id")),
  responses(
    (status = 200, description = "User details", body = ApiSuccessResponseBody<UserResponse>),
    (status = 404, description = "User not found"),
  ),
)]
#[get("/users/<id>")]
pub async fn get_user(
  caller: Result<Caller, ApiError>,
  id: i32,
  store: &State<SharedStore>,
  urls: BaseUrl,
) -> Result<ApiSuccessResponse<UserResponse>, ApiError> {
  caller?;
  let record = store.get_user(id).await?.ok_or_else(ApiError::not_found)?;
  Ok(ApiSuccessResponse::new(UserResponse::new(record, &urls)))
}
