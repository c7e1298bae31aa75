pub mod config;
pub mod console;
pub mod messages;
pub mod motor;
pub mod runtime;
