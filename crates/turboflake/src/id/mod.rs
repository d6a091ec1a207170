mod machine_ids;
mod sonyflake_id;

pub use machine_ids::*;
pub use sonyflake_id::*;
