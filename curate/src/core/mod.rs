pub mod client;
pub mod clock;
pub mod cloud;
pub mod config;
pub mod retry;
