//! CLI command handlers, one per file.

mod get;
mod info;
mod platforms;
mod serve;

pub use get::run_get;
pub use info::run_info;
pub use platforms::run_platforms;
pub use serve::run_serve;
