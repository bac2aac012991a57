
mod common;

use common::{path_of, spawn};

use rocket::http::Status;
use serde_json::json;

#[rocket::async_test]
async fn gender_description_follows_gender() {
  let app = spawn().await;
  let player = app.player("Brandon", "M").await;
  assert_eq!(player["gender"], "M");
  assert_eq!(player["gender_description"], "Male");
  assert_eq!(player["scores"], json!([]));

  let (status, body) = app.patch(&path_of(&player["url"]), json!({"gender": "F"}), None).await;
  assert_eq!(status, Status::Ok);
  assert_eq!(body["gender"], "F");
  assert_eq!(body["gender_description"], "Female");
  assert_eq!(body["name"], "Brandon");
}

#[rocket::async_test]
async fn gender_defaults_to_male() {
  let app = spawn().await;
  let (status, body) = app.post("/players/", json!({"name": "Kevin"}), None).await;
  assert_eq!(status, Status::Created);
  assert_eq!(body["gender"], "M");
}

#[rocket::async_test]
async fn invalid_gender_names_the_field() {
  let app = spawn().await;
  let (status, body) = app.post("/players/", json!({"name": "Kevin", "gender": "X"}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "gender");
  let (_, list) = app.get("/players/").await;
  assert_eq!(list["count"], 0);
}

#[rocket::async_test]
async fn player_names_are_bounded() {
  let app = spawn().await;
  let (status, body) = app.post("/players/", json!({"name": "x".repeat(51)}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "name");
  let (status, _) = app.post("/players/", json!({"name": "x".repeat(50)}), None).await;
  assert_eq!(status, Status::Created);
}

#[rocket::async_test]
async fn players_embed_scores_highest_first() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Shooter").await;
  app.game(&alice, "Doom", "Shooter").await;
  let player = app.player("Kevin", "M").await;
  for score in [100, 300, 200] {
    let payload = json!({"player": "Kevin", "game": "Doom", "score": score, "score_date": "2024-01-01T00:00:00Z"});
    let (status, _) = app.post("/player-scores/", payload, None).await;
    assert_eq!(status, Status::Created);
  }
  let (_, body) = app.get(&path_of(&player["url"])).await;
  let scores: Vec<i64> = body["scores"].as_array().unwrap().iter().map(|s| s["score"].as_i64().unwrap()).collect();
  assert_eq!(scores, [300, 200, 100]);
  assert_eq!(body["scores"][0]["game"]["name"], "Doom");
  assert_eq!(body["scores"][0]["game"]["owner"], "alice");
}

#[rocket::async_test]
async fn players_filter_by_gender() {
  let app = spawn().await;
  app.player("Kevin", "M").await;
  app.player("Brandon", "F").await;
  let (_, body) = app.get("/players/?gender=F").await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["results"][0]["name"], "Brandon");
  let (status, body) = app.get("/players/?gender=Q").await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "gender");
}

#[rocket::async_test]
async fn limit_is_clamped_and_pages_link() {
  let app = spawn().await;
  for i in 0..10 {
    app.player(&format!("Player {i:02}"), "M").await;
  }

  let (_, body) = app.get("/players/").await;
  assert_eq!(body["count"], 10);
  assert_eq!(body["results"].as_array().unwrap().len(), 4);
  assert_eq!(body["previous"], json!(null));
  assert_eq!(body["next"], "http://testserver/players/?limit=4&offset=4");

  let (_, body) = app.get("/players/?limit=100").await;
  assert_eq!(body["results"].as_array().unwrap().len(), 8);
  assert_eq!(body["next"], "http://testserver/players/?limit=8&offset=8");

  let (_, body) = app.get(&path_of(&body["next"])).await;
  assert_eq!(body["results"].as_array().unwrap().len(), 2);
  assert_eq!(body["results"][0]["name"], "Player 08");
  assert_eq!(body["next"], json!(null));
  assert_eq!(body["previous"], "http://testserver/players/?limit=8");
}

#[rocket::async_test]
async fn deleting_a_player_deletes_their_scores() {
  let app = spawn().await;
  let alice = app.user("alice").await;
  app.category("Shooter").await;
  app.game(&alice, "Doom", "Shooter").await;
  let player = app.player("Kevin", "M").await;
  let payload = json!({"player": "Kevin", "game": "Doom", "score": 10, "score_date": "2024-01-01T00:00:00Z"});
  let (_, score) = app.post("/player-scores/", payload, None).await;

  assert_eq!(app.delete(&path_of(&player["url"]), None).await, Status::NoContent);
  let (status, _) = app.get(&path_of(&score["url"])).await;
  assert_eq!(status, Status::NotFound);
}

#[rocket::async_test]
async fn put_needs_a_name_and_keeps_the_gender() {
  let app = spawn().await;
  let player = app.player("Brandon", "F").await;
  let path = path_of(&player["url"]);

  let (status, body) = app.put(&path, json!({"gender": "M"}), None).await;
  assert_eq!(status, Status::BadRequest);
  assert_eq!(body["field"], "name");

  let (status, body) = app.put(&path, json!({"name": "Brenda"}), None).await;
  assert_eq!(status, Status::Ok, "{body}");
  assert_eq!(body["name"], "Brenda");
  assert_eq!(body["gender"], "F");

  let (status, body) = app.put(&path, json!({"name": "Brenda", "gender": "M"}), None).await;
  assert_eq!(status, Status::Ok, "{body}");
  assert_eq!(body["gender_description"], "Male");
}
