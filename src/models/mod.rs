pub mod enums;
pub mod lead;

pub use enums::*;
pub use lead::*;
