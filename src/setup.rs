
//! User provisioning. Users are never created through the HTTP API.

use crate::db::models::{NewUser, User};
use crate::db::schema;
use crate::store::Store;
use crate::util::generate_key;

use uuid::Uuid;
use diesel::prelude::*;
use diesel_async::{RunQueryDsl, AsyncConnection, AsyncPgConnection};

use std::env;

/// A user with a freshly generated API key.
pub fn new_user(username: &str) -> NewUser {
  NewUser {
    user_uuid: Uuid::new_v4(),
    username: username.to_owned(),
    api_key: Some(generate_key()),
  }
}

/// Inserts a user into the PostgreSQL database named by
/// `DATABASE_URL` and prints its API key.
pub async fn create_user(username: &str) -> anyhow::Result<()> {
  let mut connection = AsyncPgConnection::establish(&env::var("DATABASE_URL")?).await?;

  let existing_user = schema::users::table
    .filter(schema::users::username.eq(username));
  if diesel::select(diesel::dsl::exists(existing_user)).get_result(&mut connection).await? {
    anyhow::bail!("User {username} already exists");
  }

  let new_user = new_user(username);
  let user = diesel::insert_into(schema::users::table)
    .values(&new_user)
    .returning(User::as_returning())
    .get_result(&mut connection)
    .await?;

  println!("Successfully created user.");
  println!("  id = {}", user.id);
  println!("  username = {}", user.username);
  println!("  api key = {}", user.api_key.as_deref().unwrap_or_default());
  Ok(())
}

/// Creates a user in `store`, logging its API key.
pub async fn seed_user<S: Store + ?Sized>(store: &S, username: &str) -> anyhow::Result<User> {
  let user = store.create_user(new_user(username)).await?;
  log::info!(
    "Seeded user {} (id {}) with API key {}",
    user.username,
    user.id,
    user.api_key.as_deref().unwrap_or_default(),
  );
  Ok(user)
}
