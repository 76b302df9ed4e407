pub mod access;
pub mod matrix;

pub use matrix::{Access, AccessMatrix};
