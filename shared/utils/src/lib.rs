pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod inventory;

pub use self::config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
