pub mod activity;
pub mod app;
pub mod auth;
pub mod blob;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use app::app;
pub use state::AppState;
