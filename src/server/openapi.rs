
use super::{categories, games, players, scores, users};

use utoipa::{Modify, OpenApi, openapi};
use utoipa::openapi::security::{SecurityScheme, ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityRequirement};

#[derive(OpenApi)]
#[openapi(
  paths(
    super::index, super::authorize,
    categories::list_game_categories, categories::create_game_category, categories::get_game_category,
    categories::replace_game_category, categories::update_game_category, categories::delete_game_category,
    games::list_games, games::create_game, games::get_game,
    games::replace_game, games::update_game, games::delete_game,
    players::list_players, players::create_player, players::get_player,
    players::replace_player, players::update_player, players::delete_player,
    scores::list_player_scores, scores::create_player_score, scores::get_player_score,
    scores::replace_player_score, scores::update_player_score, scores::delete_player_score,
    users::list_users, users::get_user,
  ),
  tags(
    (name = "index", description = "Entry point linking every collection"),
    (name = "authorization", description = "Exchange an API key for a bearer token"),
    (name = "game-category", description = "Game categories, throttled per client"),
    (name = "game", description = "Games, writable by their owner"),
    (name = "player", description = "Players and their scores"),
    (name = "player-score", description = "Individual scores"),
    (name = "user", description = "Read-only view of users and the games they own"),
  ),
  modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
  fn modify(&self, openapi: &mut openapi::OpenApi) {
    let mut components = openapi.components.take().unwrap_or_default();

    let api_key = SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key")));
    components.add_security_scheme("X-Api-Key", api_key);

    let basic = SecurityScheme::Http(Http::new(HttpAuthScheme::Basic));
    components.add_security_scheme("Basic", basic);

    let jwt = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
    components.add_security_scheme("Bearer", jwt);

    openapi.components = Some(components);
    openapi.security = Some(vec![
      SecurityRequirement::new("Basic".to_string(), Vec::<String>::new()),
      SecurityRequirement::new("Bearer".to_string(), Vec::<String>::new()),
    ]);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn document_lists_every_collection() {
    let doc = ApiDoc::openapi();
    for path in ["/", "/authorize", "/game-categories/", "/games/{id}/", "/players/", "/player-scores/{id}/", "/users/"] {
      assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
    let components = doc.components.unwrap();
    assert!(components.security_schemes.contains_key("Basic"));
    assert!(components.security_schemes.contains_key("Bearer"));
  }
}
