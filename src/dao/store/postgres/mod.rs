mod error;
mod rows;
mod store;

pub use error::PgDaoError;
pub use store::PgStore;
