
mod common;

use common::{path_of, spawn};

use rocket::http::Status;
use serde_json::json;

#[rocket::async_test]
async fn creator_becomes_owner_whatever_the_body_says() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.user("mallory").await;
  app.category("Adventure").await;

  let payload = json!({
    "name": "Firewatch",
    "game_category": "Adventure",
    "release_date": "2016-02-09T00:00:00Z",
    "owner": "mallory",
  });
  let (status, body) = app.post("/games/", payload, Some(&alice)).await;
  assert_eq!(status, Status::Created);
  assert_eq!(body["status"], "success");
  assert_eq!(body["owner"], "alice");
  assert_eq!(body["game_category"], "Adventure");
  assert_eq!(body["release_date"], "2016-02-09T00:00:00Z");
  assert_eq!(body["played"], false);
}

#[rocket::async_test]
async fn create_sets_location_header() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Adventure").await;
  let payload = json!({"name": "Firewatch", "game_category": "Adventure", "release_date": "2016-02-09"});
  let response = app.client.post("/games/")
    .header(rocket::http::ContentType::JSON)
    .header(alice.auth())
    .body(payload.to_string())
    .dispatch()
    .await;
  assert_eq!(response.status(), Status::Created);
  let location = response.headers().get_one("Location").unwrap().to_owned();
  let body: serde_json::Value = response.into_json().await.unwrap();
  assert_eq!(body["url"], location.as_str());
}

#[rocket::async_test]
async fn anonymous_create_is_unauthorized() {
  let app = spawn().await;
  app.category("Adventure").await;
  let payload = json!({"name": "Firewatch", "game_category": "Adventure", "release_date": "2016-02-09T00:00:00Z"});
  let (status, body) = app.post("/games/", payload, None).await;
  assert_eq!(status, Status::Unauthorized);
  assert_eq!(body["status"], "error");
  let (_, list) = app.get("/games/").await;
  assert_eq!(list["count"], 0);
}

#[rocket::async_test]
async fn unknown_category_names_the_field_and_creates_nothing() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let payload = json!({"name": "Firewatch", "game_category": "Nope", "release_date": "2016-02-09T00:00:00Z"});
  let (status, body) = app.post("/games/", payload, Some(&alice)).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "game_category");
  let (_, list) = app.get("/games/").await;
  assert_eq!(list["count"], 0);
}

#[rocket::async_test]
async fn missing_fields_are_reported() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Adventure").await;
  let (status, body) = app.post("/games/", json!({"name": "Firewatch", "game_category": "Adventure"}), Some(&alice)).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "release_date");
  assert_eq!(body["reason"], "This field is required.");
}

#[rocket::async_test]
async fn malformed_json_is_a_bad_request() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let response = app.client.post("/games/")
    .header(rocket::http::ContentType::JSON)
    .header(alice.auth())
    .body("{\"name\": ")
    .dispatch()
    .await;
  assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn only_the_owner_may_modify() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let bob = app.user("bob").await;
  app.category("Adventure").await;
  let game = app.game(&alice, "Firewatch", "Adventure").await;
  let path = path_of(&game["url"]);

  let (status, _) = app.patch(&path, json!({"played": true}), None).await;
  assert_eq!(status, Status::Unauthorized);
  let (status, _) = app.patch(&path, json!({"played": true}), Some(&bob)).await;
  assert_eq!(status, Status::Forbidden);
  assert_eq!(app.delete(&path, Some(&bob)).await, Status::Forbidden);
  assert_eq!(app.delete(&path, None).await, Status::Unauthorized);

  let (status, body) = app.patch(&path, json!({"played": "true"}), Some(&alice)).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["played"], true);
  assert_eq!(body["name"], "Firewatch");

  let (status, _) = app.get(&path).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(app.delete(&path, Some(&alice)).await, Status::NoContent);
  let (status, _) = app.get(&path).await;
  assert_eq!(status, Status::NotFound);
}

#[rocket::async_test]
async fn missing_games_check_authentication_first() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  assert_eq!(app.delete("/games/99/", None).await, Status::Unauthorized);
  assert_eq!(app.delete("/games/99/", Some(&alice)).await, Status::NotFound);
}

#[rocket::async_test]
async fn put_requires_every_field() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Adventure").await;
  app.category("Puzzle").await;
  let game = app.game(&alice, "Firewatch", "Adventure").await;
  let path = path_of(&game["url"]);

  let (status, body) = app.put(&path, json!({"name": "Firewatch"}), Some(&alice)).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "game_category");

  let payload = json!({"name": "The Witness", "game_category": "Puzzle", "release_date": "2016-01-26T00:00:00Z", "played": 1});
  let (status, body) = app.put(&path, payload, Some(&alice)).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["name"], "The Witness");
  assert_eq!(body["game_category"], "Puzzle");
  assert_eq!(body["played"], true);
  assert_eq!(body["owner"], "alice");
}

#[rocket::async_test]
async fn games_filter_and_order() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let bob = app.user("bob").await;
  app.category("Adventure").await;
  app.category("Puzzle").await;
  app.game(&alice, "Firewatch", "Adventure").await;
  app.game(&bob, "Fez", "Puzzle").await;
  app.game(&bob, "Braid", "Puzzle").await;

  let (_, body) = app.get("/games/?owner=bob").await;
  assert_eq!(body["count"], 2);
  assert_eq!(body["results"][0]["name"], "Braid");
  // Related objects are named, not numbered.
  let (_, body) = app.get(&format!("/games/?owner={}", bob.user.id)).await;
  assert_eq!(body["count"], 0);

  let (_, body) = app.get("/games/?game_category=Adventure").await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["results"][0]["name"], "Firewatch");

  let (_, body) = app.get("/games/?search=f&ordering=-name").await;
  let names: Vec<&str> = body["results"].as_array().unwrap().iter().map(|g| g["name"].as_str().unwrap()).collect();
  assert_eq!(names, ["Firewatch", "Fez"]);

  let (_, body) = app.get("/games/?played=false").await;
  assert_eq!(body["count"], 3);
  let (_, body) = app.get("/games/?played=true").await;
  assert_eq!(body["count"], 0);
}

#[rocket::async_test]
async fn unparsable_filters_name_the_parameter() {
  let app = spawn().await;
  let (status, body) = app.get("/games/?release_date=someday").await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "release_date");
  let (status, body) = app.get("/games/?played=maybe").await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "played");
}

#[rocket::async_test]
async fn paths_work_with_and_without_trailing_slash() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Adventure").await;
  let game = app.game(&alice, "Firewatch", "Adventure").await;
  let path = path_of(&game["url"]);
  assert!(path.ends_with('/'));
  let (status, _) = app.get(path.trim_end_matches('/')).await;
  assert_eq!(status, Status::Ok);
  let (status, _) = app.get("/games").await;
  assert_eq!(status, Status::Ok);
}

#[rocket::async_test]
async fn non_numeric_ids_are_not_found() {
  let app = spawn().await;
  let (status, body) = app.get("/games/abc/").await;
  assert_eq!(status, Status::NotFound);
  assert_eq!(body["status"], "error");
}

#[rocket::async_test]
async fn huge_offset_returns_an_empty_page() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Adventure").await;
  app.game(&alice, "Zelda", "Adventure").await;
  let (status, body) = app.get("/games/?offset=9223372036854775807").await;
  assert_eq!(status, Status::Ok, "{body}");
  assert_eq!(body["count"], 1);
  assert_eq!(body["results"], json!([]));
  assert_eq!(body["next"], json!(null));
}
