pub mod auth;
pub mod cache;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod negotiation;
pub mod realtime;

pub use db::create_pool;
