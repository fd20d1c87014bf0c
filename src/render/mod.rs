//! Output rendering for parsed sheets.
//!
//! The HTML renderer draws the viewer page (upload card, loading indicator,
//! data table, toasts). Markdown, plain text and JSON renderers cover the
//! same table for terminals and tooling.
//!
//! # Example
//!
//! ```no_run
//! use sheetview::render::*;
//! use sheetview::{parse_file, ReadOptions};
//!
//! let result = parse_file("campaigns.xlsx", &ReadOptions::default())?;
//!
//! let md = to_markdown(&result, &RenderOptions::default());
//! let text = to_text(&result);
//! let json = to_json(&result, JsonFormat::Pretty)?;
//! let table = to_html_table(&result);
//! # Ok::<(), sheetview::Error>(())
//! ```

mod html;
mod json;
mod markdown;
mod options;
mod text;

pub use html::{escape_html, to_html, to_html_table, EMPTY_TEXT, LOADING_TEXT, SCROLL_HEIGHT_PX};
pub use json::{to_json, JsonFormat};
pub use markdown::to_markdown;
pub use options::{RenderOptions, DEFAULT_DESCRIPTION, DEFAULT_TITLE};
pub use text::to_text;
