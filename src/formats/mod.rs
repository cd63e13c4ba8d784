pub mod articulos_mes;
pub mod detect;
pub mod locales;
pub mod temporada;

pub use articulos_mes::*;
pub use detect::*;
pub use locales::*;
pub use temporada::*;
