mod error;
mod parse;
mod source;

pub use error::TsvError;
pub use parse::FromTsvRow;
pub use source::{ParseFailure, TsvFetch, TsvSource, count_data_rows};
