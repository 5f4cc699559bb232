pub mod chatlog;
pub mod webhook;

pub use chatlog::*;
pub use webhook::*;
