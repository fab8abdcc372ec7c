pub mod error;
pub mod geocode;
pub mod logging;
pub mod nws;
pub mod pipeline;
pub mod present;
pub mod render;

pub use error::{Error, Result};
