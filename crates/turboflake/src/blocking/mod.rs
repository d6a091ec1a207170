mod sleep;
mod sonyflake;

pub use sleep::*;
pub use sonyflake::*;
