//! Markdown renderer implementation.

use crate::model::ParseResult;

use super::options::RenderOptions;

/// Convert a parse result to a Markdown pipe table.
///
/// The header row is always present; a result without rows renders a
/// "No data available" line under the table instead of body rows.
pub fn to_markdown(result: &ParseResult, options: &RenderOptions) -> String {
    if result.headers.is_empty() {
        return "No data available\n".to_string();
    }

    let cell = |text: &str| {
        let text = text.replace(['\r', '\n'], " ");
        if options.escape_special_chars {
            escape_markdown(&text)
        } else {
            text.replace('|', "\\|")
        }
    };

    let mut output = String::from("|");
    for header in &result.headers {
        output.push_str(&format!(" {} |", cell(header)));
    }
    output.push_str("\n|");
    for _ in &result.headers {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in &result.rows {
        output.push('|');
        for header in &result.headers {
            output.push_str(&format!(" {} |", cell(&row.text(header))));
        }
        output.push('\n');
    }

    if result.rows.is_empty() {
        output.push_str("\nNo data available\n");
    }

    output
}

/// Escape Markdown special characters in table cell text.
///
/// `\`, `` ` `` and `|` are always escaped. `*` and `_` are escaped only where
/// they could open or close emphasis, so `snake_case` names stay readable.
fn escape_markdown(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '`' | '|' => {
                result.push('\\');
                result.push(c);
            }
            '*' | '_' => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();

                // Intraword underscores never form emphasis
                let intraword = c == '_'
                    && prev.is_some_and(|p| p.is_alphanumeric())
                    && next.is_some_and(|n| n.is_alphanumeric());
                let spaced = prev.is_some_and(char::is_whitespace)
                    && next.is_none_or(char::is_whitespace);

                if intraword || spaced {
                    result.push(c);
                } else {
                    result.push('\\');
                    result.push(c);
                }
            }
            _ => result.push(c),
        }
    }
    result
}
