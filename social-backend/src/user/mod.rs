//! Users: persistence, find-or-create for logins, lookup by id

pub mod handlers;
pub mod model;
pub mod store;

pub use model::{User, UserResponse, UserSummary};
pub use store::{PgUserStore, UserStore};
