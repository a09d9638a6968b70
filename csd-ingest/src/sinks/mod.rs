pub mod postgres;

pub use postgres::{InsertRow, PostgresSink};
