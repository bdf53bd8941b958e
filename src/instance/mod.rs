//! Classic instance documents: raw decoding and hydration into a validated
//! model.

mod hydrate;
pub mod model;
pub mod raw;

pub use hydrate::{hydrate, hydrate_bytes};
pub use model::*;
pub use raw::{decode_instance_file, InstanceFile};
