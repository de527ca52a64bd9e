pub mod auth;
pub mod events;
pub mod formatters;
pub mod init;
pub mod schedule;
pub mod validation;
