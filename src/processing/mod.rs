//! Guitar Removal Pipeline

pub mod remover;

pub use remover::{GuitarRemover, ConversionRequest, RemovalResult, remove_guitar};
