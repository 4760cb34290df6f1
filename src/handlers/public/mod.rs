// handlers/public - token acquisition, no session required
pub mod auth;
