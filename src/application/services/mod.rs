mod executor;
mod scratch;

pub use executor::{DEFAULT_OUTPUT_FORMAT, Executor, ExecutorError, ExecutorOptions};
pub use scratch::ScratchSpace;
