pub mod config;
pub mod names;
pub mod session;
pub mod validate;
