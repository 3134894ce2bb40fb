pub mod config;
pub mod logging;

pub use config::{Environment, env_or, env_string_or};
pub use logging::setup_logging;

#[doc(hidden)]
pub use tracing;
