//! Models Module
//!
//! Domain vocabulary shared by cache keys and entries.

pub mod params;
pub mod source;

pub use params::{ParamValue, QueryParams};
pub use source::{DataSource, DataType};
