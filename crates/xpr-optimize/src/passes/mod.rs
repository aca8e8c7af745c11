// Passes - tree rewrites over expression values

pub mod expand;

pub use expand::*;
