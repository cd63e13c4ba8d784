pub mod canonical;
pub mod columns;

pub use canonical::*;
pub use columns::*;
