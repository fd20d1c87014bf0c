//! HTML renderer for the viewer page.

use crate::detect::accept_attribute;
use crate::model::ParseResult;
use crate::viewer::{Toast, ToastVariant, ViewState, Viewer};

use super::options::RenderOptions;

/// Text shown while an upload is being read.
pub const LOADING_TEXT: &str = "Loading data...";

/// Text of the single body row of a table without data.
pub const EMPTY_TEXT: &str = "No data available";

/// Height of the table scroll area, in pixels.
pub const SCROLL_HEIGHT_PX: u32 = 600;

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
.container { max-width: 72rem; margin: 0 auto; padding: 2rem 1rem; display: grid; gap: 1.5rem; }
.card { background: #fff; border: 1px solid #e2e8f0; border-radius: 0.5rem; }
.card-header { padding: 1.5rem 1.5rem 0; }
.card-title { margin: 0; font-size: 1.5rem; }
.card-description { margin: 0.375rem 0 0; color: #64748b; }
.card-content { padding: 1.5rem; }
.scroll-area { overflow: auto; border: 1px solid #e2e8f0; border-radius: 0.375rem; }
table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
thead th { position: sticky; top: 0; background: #fff; text-align: left; }
th, td { padding: 0.5rem 1rem; border-bottom: 1px solid #e2e8f0; white-space: nowrap; }
td.empty, td.loading { text-align: center; color: #64748b; height: 6rem; }
.toaster { position: fixed; bottom: 1rem; right: 1rem; list-style: none; margin: 0; padding: 0; display: grid; gap: 0.5rem; }
.toast { background: #fff; border: 1px solid #e2e8f0; border-radius: 0.375rem; padding: 1rem; min-width: 18rem; }
.toast-destructive { background: #dc2626; border-color: #dc2626; color: #fff; }
.toast-title { font-weight: 600; }
";

/// Render the viewer as HTML.
///
/// With `include_page` this is a complete document: the upload card, the
/// data card while loading or once something is loaded, and the toasts.
/// Without it only the data card is produced (empty when idle).
pub fn to_html(viewer: &Viewer, options: &RenderOptions) -> String {
    if !options.include_page {
        return data_card_for(viewer).unwrap_or_default();
    }

    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main class=\"container\">\n");

    html.push_str(&render_upload_card(viewer, options));
    if let Some(card) = data_card_for(viewer) {
        html.push_str(&card);
    }
    html.push_str("</main>\n");

    if options.include_toasts && !viewer.toasts().is_empty() {
        html.push_str(&render_toasts(viewer.toasts()));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_upload_card(viewer: &Viewer, options: &RenderOptions) -> String {
    let mut html = String::from("<section class=\"card\">\n<header class=\"card-header\">\n");
    html.push_str(&format!(
        "<h1 class=\"card-title\">{}</h1>\n",
        escape_html(&options.title)
    ));
    html.push_str(&format!(
        "<p class=\"card-description\">{}</p>\n",
        escape_html(&options.description)
    ));
    html.push_str("</header>\n<div class=\"card-content\">\n");

    let disabled = if viewer.is_loading() { " disabled" } else { "" };
    html.push_str(&format!(
        "<input id=\"file\" type=\"file\" accept=\"{}\"{}>\n",
        escape_html(&accept_attribute()),
        disabled
    ));

    html.push_str("</div>\n</section>\n");
    html
}

fn data_card_for(viewer: &Viewer) -> Option<String> {
    match viewer.state() {
        ViewState::Idle => None,
        ViewState::Loading { .. } => Some(render_data_card(&loading_table())),
        ViewState::Loaded(result) => Some(render_data_card(&to_html_table(result))),
    }
}

fn render_data_card(table: &str) -> String {
    let mut html = String::from("<section class=\"card\">\n<header class=\"card-header\">\n");
    html.push_str("<h2 class=\"card-title\">File Contents</h2>\n");
    html.push_str("<p class=\"card-description\">Displaying data from your Excel file</p>\n");
    html.push_str("</header>\n<div class=\"card-content\">\n");
    html.push_str(&format!(
        "<div class=\"scroll-area\" style=\"height: {}px\">\n",
        SCROLL_HEIGHT_PX
    ));
    html.push_str(table);
    html.push_str("</div>\n</div>\n</section>\n");
    html
}

/// Render the table of a parse result: one header cell per column, one row
/// per record. A record without a value for a column gets an empty cell; a
/// result without rows gets a single "No data available" row.
pub fn to_html_table(result: &ParseResult) -> String {
    let mut html = table_head(&result.headers);

    if result.rows.is_empty() {
        html.push_str(&placeholder_row(result.headers.len(), "empty", EMPTY_TEXT));
    }

    for row in &result.rows {
        html.push_str("<tr>");
        for header in &result.headers {
            html.push_str(&format!("<td>{}</td>", escape_html(&row.text(header))));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

/// The table shown while an upload is read: no columns yet, one loading row.
fn loading_table() -> String {
    let mut html = table_head(&[]);
    html.push_str(&placeholder_row(0, "loading", LOADING_TEXT));
    html.push_str("</tbody>\n</table>\n");
    html
}

fn table_head(headers: &[String]) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    html
}

fn placeholder_row(columns: usize, class: &str, text: &str) -> String {
    format!(
        "<tr><td colspan=\"{}\" class=\"{}\">{}</td></tr>\n",
        columns.max(1),
        class,
        text
    )
}

fn render_toasts(toasts: &[Toast]) -> String {
    let mut html = String::from("<ol class=\"toaster\">\n");
    for toast in toasts {
        let class = match toast.variant {
            ToastVariant::Default => "toast",
            ToastVariant::Destructive => "toast toast-destructive",
        };
        html.push_str(&format!("<li class=\"{}\" role=\"status\">", class));
        html.push_str(&format!(
            "<div class=\"toast-title\">{}</div>",
            escape_html(&toast.title)
        ));
        html.push_str(&format!(
            "<div class=\"toast-description\">{}</div>",
            escape_html(&toast.description)
        ));
        html.push_str("</li>\n");
    }
    html.push_str("</ol>\n");
    html
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
