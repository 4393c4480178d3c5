//! Pure view builders over raw pod objects. Nothing here performs I/O.

pub mod detail;
pub mod filter;
pub mod logs;
pub mod normalize;
