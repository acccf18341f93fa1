pub mod billing;
pub mod job;
pub mod params;
pub mod schema;
