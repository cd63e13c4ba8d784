pub mod identity;
pub mod registry;

pub use identity::*;
pub use registry::*;
