mod asset;
mod generation_by_fuel;
mod interchange;
mod summary;
pub mod timestamp;

pub use asset::Asset;
pub use generation_by_fuel::GenerationByFuel;
pub use interchange::Interchange;
pub use summary::Summary;
pub use timestamp::{parse_last_updated, TimestampError};
