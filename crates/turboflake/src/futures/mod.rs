#[cfg(any(feature = "async-tokio", feature = "async-smol"))]
mod runtime;
mod sleep_provider;
mod sonyflake;
mod stream;

#[cfg_attr(docsrs, doc(cfg(any(feature = "async-tokio", feature = "async-smol"))))]
#[cfg(any(feature = "async-tokio", feature = "async-smol"))]
pub use runtime::*;
pub(crate) use sleep_provider::ErasedSleep;
pub use sleep_provider::{SleepFn, SleepProvider};
pub use sonyflake::*;
pub use stream::*;
