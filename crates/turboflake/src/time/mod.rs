mod interface;
mod system_clock;
mod tick;

pub use interface::*;
pub use system_clock::*;
pub use tick::*;
