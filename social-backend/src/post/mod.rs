//! Posts: CRUD storage and HTTP handlers

pub mod handlers;
pub mod model;
pub mod store;

pub use model::{Post, PostRequest, PostResponse};
pub use store::{PgPostStore, PostStore};
