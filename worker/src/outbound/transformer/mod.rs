//! Child-process transformer adapter.

mod process;

pub use process::{DEFAULT_TRANSFORM_COMMAND, ProcessTransformer};
