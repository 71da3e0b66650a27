pub mod day;
pub mod env;
pub mod telemetry;
