pub mod migrate;
pub mod records;
pub mod types;

pub use sqlx::postgres::PgPool;
pub use types::*;
