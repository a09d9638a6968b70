pub mod schema;

pub use schema::ensure_schema;
