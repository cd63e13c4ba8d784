pub mod code_classifier;

pub use code_classifier::*;
