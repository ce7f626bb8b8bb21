pub mod schema;
pub mod repository;
pub mod migrations;
pub mod connection;
pub mod store;

pub use schema::*;
pub use repository::*;
pub use connection::*;
pub use store::*;
