//! Tree operations — lookup and COW path-copy mutation.

pub mod find;
pub mod insert;
