pub mod clock;
pub mod config;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use config::SecadConfig;
pub use types::*;
