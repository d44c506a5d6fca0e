//! HOG forest handling for hognest
//!
//! Tree views, reference catalogs, the nested-set encoder and the file
//! formats it reads and writes.

pub mod catalog;
pub mod formats;
pub mod hog;
pub mod nested_set;

// Re-export commonly used types
pub use catalog::{GeneCatalog, GeneSet, GenomeSharingMap};
pub use hog::{GeneRef, HogArena, HogForest, HogGroup, HogNode, OrthologGroupNode};
pub use nested_set::{encode, EncodeReport, EncoderOptions, Encoding, NestedSetEncoder};
