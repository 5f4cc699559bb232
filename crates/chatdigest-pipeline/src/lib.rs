pub mod analyze;
pub mod artifacts;
pub mod config;
pub mod fetch;
pub mod gather;
pub mod generator;
pub mod html;
pub mod post;
pub mod util;

pub use analyze::*;
pub use artifacts::*;
pub use config::*;
pub use fetch::*;
pub use gather::*;
pub use generator::*;
pub use html::*;
pub use post::*;
pub use util::*;
