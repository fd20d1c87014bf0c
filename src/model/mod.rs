//! Data model for parsed workbooks.
//!
//! Readers turn workbook bytes into a [`Workbook`] holding the first
//! [`Sheet`]; the records module turns that grid into a [`ParseResult`]
//! of header-keyed [`Record`]s, which the viewer stores and renders.

mod cell;
mod record;
mod sheet;
mod workbook;

pub use cell::*;
pub use record::*;
pub use sheet::*;
pub use workbook::*;
