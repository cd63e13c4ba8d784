pub mod cleaning;
pub mod excel;

pub use cleaning::*;
pub use excel::*;
