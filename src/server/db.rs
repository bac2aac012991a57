
use rocket_db_pools::Database;
use rocket_db_pools::diesel::PgPool;

/// Connection pool for the `gametracker` database configured under
/// `databases.gametracker` in Rocket's configuration.
#[derive(Database)]
#[database("gametracker")]
pub struct Db(pub PgPool);
