//! Series normalization from raw tabular interest data.

mod normalize;
mod table;

pub use normalize::{
    normalize, normalize_with, DuplicatePolicy, NormalizeOptions, DEFAULT_PARTIAL_FIELD,
};
pub use table::{RawTable, Record};
