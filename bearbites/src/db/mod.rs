mod connection;
pub(crate) mod schema;

pub use connection::Database;
