mod builder;
mod lock;
pub(crate) mod mutex;
mod sequencer;
mod sonyflake;
mod status;
#[cfg(test)]
mod tests;

pub use builder::*;
pub use lock::*;
pub use sequencer::*;
pub use sonyflake::*;
pub use status::*;
