//! Rendering options configuration.

/// Default page heading.
pub const DEFAULT_TITLE: &str = "Excel File Viewer";

/// Default page subheading.
pub const DEFAULT_DESCRIPTION: &str = "Upload your Excel file to view its contents";

/// Options for rendering the viewer and its data.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Heading of the upload card
    pub title: String,

    /// Text under the heading
    pub description: String,

    /// Render a full HTML document (false renders only the data table card)
    pub include_page: bool,

    /// Render pending toasts into the page
    pub include_toasts: bool,

    /// Escape special Markdown characters in cell text
    pub escape_special_chars: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            include_page: true,
            include_toasts: true,
            escape_special_chars: true,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page heading.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the text under the heading.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Render only the data table card instead of a full page.
    pub fn fragment(mut self) -> Self {
        self.include_page = false;
        self
    }

    /// Include or omit toasts.
    pub fn with_toasts(mut self, include: bool) -> Self {
        self.include_toasts = include;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }
}
