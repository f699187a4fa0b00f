pub mod config;
pub mod drive;
pub mod hub;
pub mod menu;
pub mod messages;
pub mod robot;
pub mod runs;
pub mod runtime;
pub mod sim;
