pub mod block;
pub mod message;
pub mod usage;

pub use block::*;
pub use message::*;
pub use usage::*;
