//! Domain layer
//!
//! Pure, storage-agnostic building blocks shared by the data-access and
//! presentation layers.

pub mod pagination;
