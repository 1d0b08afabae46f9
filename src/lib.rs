//! In-memory NBA player statistics table served over a REST endpoint

pub mod args;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use config::Config;
pub use db::PlayerTable;
pub use routes::{router, AppState};
