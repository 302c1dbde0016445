pub mod clock;
pub mod config;
pub mod logging;
pub mod telemetry;

pub use clock::*;
pub use config::*;
pub use logging::*;
