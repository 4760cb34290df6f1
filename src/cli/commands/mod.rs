pub mod auth;
pub mod blob;
pub mod dashboard;
pub mod data;
pub mod server;
