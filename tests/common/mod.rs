
#![allow(dead_code)]

use gametracker::db::models::User;
use gametracker::server::build_rocket_with;
use gametracker::server::config::ApiConfig;
use gametracker::server::throttle::{Rate, GAME_CATEGORIES_SCOPE};
use gametracker::setup;
use gametracker::store::{MemoryStore, SharedStore};
use gametracker::util::header::Authorization;

use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::Value;

use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://testserver";

pub struct TestApp {
  pub client: Client,
  pub store: Arc<MemoryStore>,
}

/// Configuration with a throttle generous enough never to trigger.
pub fn test_config() -> ApiConfig {
  let mut config = ApiConfig {
    base_url: Some(BASE_URL.to_owned()),
    jwt_secret_key: Some("Z2FtZXRyYWNrZXJ0ZXN0c2VjcmV0".to_owned()),
    ..ApiConfig::default()
  };
  config.throttle_rates.insert(GAME_CATEGORIES_SCOPE.to_owned(), Rate::new(10_000, Duration::from_secs(3600)));
  config
}

pub async fn spawn() -> TestApp {
  spawn_with(test_config()).await
}

pub async fn spawn_with(config: ApiConfig) -> TestApp {
  let store = Arc::new(MemoryStore::new());
  let shared: SharedStore = store.clone();
  let rocket = build_rocket_with(rocket::build(), config, shared);
  let client = Client::tracked(rocket).await.expect("valid rocket instance");
  TestApp { client, store }
}

/// A user along with the `Authorization` header that authenticates
/// them.
pub struct TestUser {
  pub user: User,
  pub api_key: String,
}

impl TestUser {
  pub fn auth(&self) -> Header<'static> {
    let authorization = Authorization::basic(&self.user.username, &self.api_key);
    Header::new("Authorization", authorization.to_string())
  }
}

impl TestApp {
  pub async fn user(&self, username: &str) -> TestUser {
    let user = setup::seed_user(self.store.as_ref(), username).await.unwrap();
    let api_key = user.api_key.clone().unwrap();
    TestUser { user, api_key }
  }

  pub async fn get(&self, uri: &str) -> (Status, Value) {
    let response = self.client.get(uri.to_owned()).dispatch().await;
    read(response).await
  }

  pub async fn get_as(&self, uri: &str, user: &TestUser) -> (Status, Value) {
    let response = self.client.get(uri.to_owned()).header(user.auth()).dispatch().await;
    read(response).await
  }

  pub async fn post(&self, uri: &str, body: Value, user: Option<&TestUser>) -> (Status, Value) {
    let mut request = self.client.post(uri.to_owned())
      .header(ContentType::JSON)
      .body(body.to_string());
    if let Some(user) = user {
      request.add_header(user.auth());
    }
    read(request.dispatch().await).await
  }

  pub async fn put(&self, uri: &str, body: Value, user: Option<&TestUser>) -> (Status, Value) {
    let mut request = self.client.put(uri.to_owned())
      .header(ContentType::JSON)
      .body(body.to_string());
    if let Some(user) = user {
      request.add_header(user.auth());
    }
    read(request.dispatch().await).await
  }

  pub async fn patch(&self, uri: &str, body: Value, user: Option<&TestUser>) -> (Status, Value) {
    let mut request = self.client.patch(uri.to_owned())
      .header(ContentType::JSON)
      .body(body.to_string());
    if let Some(user) = user {
      request.add_header(user.auth());
    }
    read(request.dispatch().await).await
  }

  pub async fn delete(&self, uri: &str, user: Option<&TestUser>) -> Status {
    let mut request = self.client.delete(uri.to_owned());
    if let Some(user) = user {
      request.add_header(user.auth());
    }
    request.dispatch().await.status()
  }

  pub async fn category(&self, name: &str) -> Value {
    let (status, body) = self.post("/game-categories/", serde_json::json!({ "name": name }), None).await;
    assert_eq!(status, Status::Created, "{body}");
    body
  }

  pub async fn game(&self, owner: &TestUser, name: &str, category: &str) -> Value {
    let payload = serde_json::json!({
      "name": name,
      "game_category": category,
      "release_date": "2020-01-01T00:00:00Z",
    });
    let (status, body) = self.post("/games/", payload, Some(owner)).await;
    assert_eq!(status, Status::Created, "{body}");
    body
  }

  pub async fn player(&self, name: &str, gender: &str) -> Value {
    let (status, body) = self.post("/players/", serde_json::json!({ "name": name, "gender": gender }), None).await;
    assert_eq!(status, Status::Created, "{body}");
    body
  }
}

/// Path and query of an absolute URL produced by the API.
pub fn path_of(url: &Value) -> String {
  url.as_str().unwrap().strip_prefix(BASE_URL).unwrap().to_owned()
}

async fn read(response: LocalResponse<'_>) -> (Status, Value) {
  let status = response.status();
  let body = response.into_string().await.unwrap_or_default();
  let value = if body.is_empty() { Value::Null } else { serde_json::from_str(&body).unwrap() };
  (status, value)
}
