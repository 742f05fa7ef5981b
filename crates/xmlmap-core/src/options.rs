//! Conversion settings.

/// Default prefix prepended to every attribute key.
pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "attribute_";

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// How accumulated character data is used when an element collapses to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Keep text exactly as delivered, whitespace included.
    #[default]
    Preserve,
    /// Strip leading and trailing whitespace.
    Trim,
}

impl TextMode {
    pub(crate) fn apply(self, text: String) -> String {
        match self {
            TextMode::Preserve => text,
            TextMode::Trim => {
                let trimmed = text.trim();
                if trimmed.len() == text.len() {
                    text
                } else {
                    trimmed.to_string()
                }
            }
        }
    }
}

/// Options shared by every conversion entry point.
///
/// ```
/// use xmlmap_core::{ConvertOptions, TextMode};
///
/// let options = ConvertOptions::new()
///     .with_text_mode(TextMode::Trim)
///     .with_attribute_prefix("@");
/// assert_eq!(options.attribute_prefix(), "@");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    attribute_prefix: String,
    text: TextMode,
    max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
            text: TextMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the prefix used for attribute keys.
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text = mode;
        self
    }

    /// Deepest element nesting accepted; deeper documents are malformed.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn attribute_prefix(&self) -> &str {
        &self.attribute_prefix
    }

    pub fn text_mode(&self) -> TextMode {
        self.text
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
