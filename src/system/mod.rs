//! System-level modules: logging setup and the process panic hook.

pub mod logging;
pub mod panic_handler;
