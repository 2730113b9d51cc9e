//! # xlmap-array
//!
//! Exposes functions over record sequences as worksheet functions over cell
//! arrays.
//!
//! A function registered with [`ArrayMapping::MapArray`] whose parameters and
//! return value are sequences of records is wrapped in a shim that:
//! - matches the header row of each input array to the record's properties,
//!   ignoring case and column order
//! - builds one record per data row, through a positional constructor when
//!   one fits and property setters otherwise
//! - calls the function and writes the returned records back out, with the
//!   output property names as header row
//!
//! Registrations that cannot be shimmed are passed through unchanged.
//!
//! [`ArrayMapping::MapArray`]: xlmap_core::ArrayMapping::MapArray

mod options;
mod process;
mod reflect;
mod shim;

pub use options::MapArrayOptions;
pub use process::{
    process_map_array_functions, process_map_array_functions_with, try_shim,
    MapArrayFunctions, MapArrayFunctionsExt, ShimmedRegistration,
};
pub use reflect::{describe_record_fields, reflect};
pub use shim::{make_array_shim_1to1, make_array_shim_2to1, ArrayShim1To1, ArrayShim2To1};
