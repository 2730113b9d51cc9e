//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - A single value handed over by the host
//! - [`CellArray`] - A 2-D grid of cell values (a worksheet range)

mod array;
mod value;

pub use array::CellArray;
pub use value::{CellError, CellValue, SharedString};
