pub mod cloudwatch;
pub mod logging;
