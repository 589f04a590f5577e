pub mod config;
pub mod error;

pub use config::{DonoraConfig, DonoraSettings, WebSettings};
pub use error::{DonoraError, Result};
