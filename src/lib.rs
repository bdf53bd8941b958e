pub mod attr;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inline;
pub mod instance;
pub mod source;

// Re-exports
pub use config::Config;
pub use error::{Result, XbrlError};
pub use inline::{convert, extract, ConvertOptions, Document};
pub use instance::{decode_instance_file, hydrate, hydrate_bytes, Instance};
