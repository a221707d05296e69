mod component;
mod docgen;

pub use component::*;
pub use docgen::*;
