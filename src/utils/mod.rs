// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod errors;
mod logger;
mod text;

// Public re-exports - the ONLY way to access utils functionality
pub use errors::NativeAiError;
pub use logger::{init_logger, log_status};
pub use text::{single_line, truncate_chars};
