// handlers/protected - every route here sits behind the session gate and
// receives the caller's `Identity` as a request extension.
pub mod activity;
pub mod auth;
pub mod blob;
pub mod collection;
pub mod skills;
