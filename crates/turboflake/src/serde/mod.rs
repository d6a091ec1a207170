mod sonyflake;

pub use sonyflake::*;
