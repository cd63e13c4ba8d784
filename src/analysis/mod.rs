pub mod clients;
pub mod products;
pub mod typologies;

pub use clients::*;
pub use products::*;
pub use typologies::*;
