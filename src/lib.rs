
pub mod args;
pub mod db;
pub mod logger;
pub mod server;
pub mod setup;
pub mod store;
pub mod util;
