
//! Command line argument parser.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
  /// Serve from an in-memory store instead of PostgreSQL. Nothing is
  /// persisted across restarts.
  #[arg(long)]
  pub in_memory: bool,
  /// With --in-memory, create a user with this username at startup
  /// and log its API key. May be repeated.
  #[arg(long = "seed-user", value_name = "USERNAME", requires = "in_memory")]
  pub seed_users: Vec<String>,
  /// Create a user with this username in the PostgreSQL database
  /// named by DATABASE_URL, print its API key, and exit instead of
  /// running the server.
  #[arg(long, value_name = "USERNAME", conflicts_with = "in_memory")]
  pub create_user: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_postgres_server() {
    let args = CliArgs::try_parse_from(["gametracker"]).unwrap();
    assert!(!args.in_memory);
    assert!(args.seed_users.is_empty());
    assert_eq!(args.create_user, None);
  }

  #[test]
  fn seed_users_repeat() {
    let args = CliArgs::try_parse_from(["gametracker", "--in-memory", "--seed-user", "alice", "--seed-user", "bob"]).unwrap();
    assert!(args.in_memory);
    assert_eq!(args.seed_users, ["alice", "bob"]);
  }

  #[test]
  fn seed_users_need_memory_store() {
    assert!(CliArgs::try_parse_from(["gametracker", "--seed-user", "alice"]).is_err());
    assert!(CliArgs::try_parse_from(["gametracker", "--in-memory", "--create-user", "alice"]).is_err());
  }
}
