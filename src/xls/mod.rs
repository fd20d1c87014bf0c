//! XLS (Excel 97-2003) workbook reader.
//!
//! Legacy workbooks are a BIFF8 record stream named `Workbook` inside a
//! Compound File Binary container. The reader collects the workbook globals
//! (sheet list, shared strings, number formats, date system) and the cell
//! records of a worksheet substream.

mod biff;
mod parser;
mod strings;

pub use parser::XlsParser;
