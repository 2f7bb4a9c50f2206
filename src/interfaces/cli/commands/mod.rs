pub mod config_gen;
pub mod token;
pub mod webhook;
