pub mod ack;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod rooms;
pub mod timerange;
pub mod transcript;

pub use ack::*;
pub use error::*;
pub use extract::*;
pub use prompt::*;
pub use rooms::*;
pub use timerange::*;
pub use transcript::*;
