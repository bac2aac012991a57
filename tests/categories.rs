
mod common;

use common::{path_of, spawn, spawn_with, test_config};

use gametracker::server::throttle::{Rate, GAME_CATEGORIES_SCOPE};
use gametracker::store::{PageRequest, Store};

use rocket::http::Status;
use serde_json::json;

use std::time::Duration;

#[rocket::async_test]
async fn category_representation() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let category = app.category("Adventure").await;
  assert_eq!(category["name"], "Adventure");
  assert_eq!(category["games"], json!([]));
  let game = app.game(&alice, "Firewatch", "Adventure").await;

  let (status, body) = app.get(&path_of(&category["url"])).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["pk"], category["pk"]);
  assert_eq!(body["games"], json!([game["url"]]));
}

#[rocket::async_test]
async fn search_matches_name_prefix() {
  let app = spawn().await;
  for name in ["Fire Emblem", "Firewatch Sims", "Wildfire", "fireworks"] {
    app.category(name).await;
  }
  let (status, body) = app.get("/game-categories/?search=Fire").await;
  assert_eq!(status, Status::Ok);
  let names: Vec<&str> = body["results"].as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap()).collect();
  assert_eq!(names, ["Fire Emblem", "Firewatch Sims", "fireworks"]);
  assert!(names.iter().all(|name| name.to_lowercase().starts_with("fire")));
}

#[rocket::async_test]
async fn exact_name_filter_and_ordering() {
  let app = spawn().await;
  for name in ["Puzzle", "Adventure", "Shooter"] {
    app.category(name).await;
  }
  let (_, body) = app.get("/game-categories/?name=Puzzle").await;
  assert_eq!(body["count"], 1);
  let (_, body) = app.get("/game-categories/?ordering=-name").await;
  assert_eq!(body["results"][0]["name"], "Shooter");
  let (_, body) = app.get("/game-categories/?ordering=bogus").await;
  assert_eq!(body["results"][0]["name"], "Adventure");
}

#[rocket::async_test]
async fn duplicate_names_are_rejected() {
  let app = spawn().await;
  app.category("Adventure").await;
  let (status, body) = app.post("/game-categories/", json!({"name": "Adventure"}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "name");
  let (status, body) = app.post("/game-categories/", json!({"name": "   "}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "name");
}

#[rocket::async_test]
async fn rename_and_delete() {
  let app = spawn().await;
  let category = app.category("Adventure").await;
  let path = path_of(&category["url"]);
  let (status, body) = app.patch(&path, json!({}), None).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["name"], "Adventure");
  let (status, body) = app.put(&path, json!({}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "name");
  let (status, body) = app.put(&path, json!({"name": "Graphic Adventure"}), None).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["name"], "Graphic Adventure");
  assert_eq!(app.delete(&path, None).await, Status::NoContent);
  assert_eq!(app.delete(&path, None).await, Status::NotFound);
}

#[rocket::async_test]
async fn deleting_a_category_deletes_its_games() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  let category = app.category("Adventure").await;
  app.category("Puzzle").await;
  let game = app.game(&alice, "Firewatch", "Adventure").await;
  app.game(&alice, "Braid", "Puzzle").await;

  assert_eq!(app.delete(&path_of(&category["url"]), None).await, Status::NoContent);
  let (status, _) = app.get(&path_of(&game["url"])).await;
  assert_eq!(status, Status::NotFound);
  let (_, body) = app.get("/games/").await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["results"][0]["name"], "Braid");
}

#[rocket::async_test]
async fn list_and_detail_share_a_quota() {
  let mut config = test_config();
  config.throttle_rates.insert(GAME_CATEGORIES_SCOPE.to_owned(), Rate::new(4, Duration::from_secs(3600)));
  let app = spawn_with(config).await;
  let category = app.category("Adventure").await;
  let path = path_of(&category["url"]);

  assert_eq!(app.get("/game-categories/").await.0, Status::Ok);
  assert_eq!(app.get(&path).await.0, Status::Ok);
  assert_eq!(app.get("/game-categories/").await.0, Status::Ok);

  let response = app.client.get(path.clone()).dispatch().await;
  assert_eq!(response.status(), Status::TooManyRequests);
  let retry_after: u64 = response.headers().get_one("Retry-After").unwrap().parse().unwrap();
  assert!(retry_after > 0 && retry_after <= 3600);

  // Other collections are unaffected.
  assert_eq!(app.get("/games/").await.0, Status::Ok);
}

#[rocket::async_test]
async fn quota_is_per_user() {
  let mut config = test_config();
  config.throttle_rates.insert(GAME_CATEGORIES_SCOPE.to_owned(), Rate::new(1, Duration::from_secs(3600)));
  let app = spawn_with(config).await;
  let alice = app.user("alice").await;
  let bob = app.user("bob").await;
  assert_eq!(app.get_as("/game-categories/", &alice).await.0, Status::Ok);
  assert_eq!(app.get_as("/game-categories/", &alice).await.0, Status::TooManyRequests);
  assert_eq!(app.get_as("/game-categories/", &bob).await.0, Status::Ok);
}

#[rocket::async_test]
async fn writes_count_against_the_quota() {
  let mut config = test_config();
  config.throttle_rates.insert(GAME_CATEGORIES_SCOPE.to_owned(), Rate::new(2, Duration::from_secs(3600)));
  let app = spawn_with(config).await;
  let category = app.category("Adventure").await;
  let path = path_of(&category["url"]);

  let (status, body) = app.patch(&path, json!({ "name": "Puzzle" }), None).await;
  assert_eq!(status, Status::Ok, "{body}");

  let (status, body) = app.post("/game-categories/", json!({ "name": "Racing" }), None).await;
  assert_eq!(status, Status::TooManyRequests, "{body}");
  assert_eq!(app.put(&path, json!({ "name": "Strategy" }), None).await.0, Status::TooManyRequests);
  assert_eq!(app.delete(&path, None).await, Status::TooManyRequests);
  assert_eq!(app.get(&path).await.0, Status::TooManyRequests);
  assert_eq!(app.store.list_game_categories(&Default::default(), PageRequest { limit: 10, offset: 0 }).await.unwrap().count, 1);
}
