
use gametracker::args::CliArgs;
use gametracker::server::{run_server, Backend};
use gametracker::store::{MemoryStore, SharedStore};
use gametracker::{logger, setup};

use clap::Parser;

use std::sync::Arc;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
  let args = CliArgs::parse();
  logger::init()?;

  if let Some(username) = args.create_user {
    return setup::create_user(&username).await;
  }

  let backend = if args.in_memory {
    let store = MemoryStore::new();
    for username in &args.seed_users {
      setup::seed_user(&store, username).await?;
    }
    log::warn!("Serving from an in-memory store; data will not survive a restart");
    let store: SharedStore = Arc::new(store);
    Backend::Custom(store)
  } else {
    Backend::Postgres
  };
  run_server(backend).await?;
  Ok(())
}
