mod errors;
mod sqlite;
mod store_type;
mod types;

pub use errors::UserError;
pub use store_type::{CredentialStore, DEFAULT_SEED_BATCH_SIZE, SqliteUserStore};
pub use types::{NewUser, UserId};
