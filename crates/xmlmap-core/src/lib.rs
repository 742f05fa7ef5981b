//! Core of the XML to map conversion: the event interface a tokenizer drives,
//! the stack-of-frames builder folding those events into [`Value`]s, and the
//! error type every entry point reports.
//!
//! ```
//! use xmlmap_core::{Attributes, ConvertOptions, MapBuilder, Value, XmlEventSink};
//!
//! let mut builder = MapBuilder::new(ConvertOptions::default());
//! builder.element_start("root", Attributes::new());
//! for text in ["x", "y"] {
//!     builder.element_start("item", Attributes::new());
//!     builder.characters(text);
//!     builder.element_end("item");
//! }
//! builder.element_end("root");
//! builder.stream_end();
//!
//! let value = builder.finish().expect("converted");
//! assert_eq!(
//!     value.get("item"),
//!     Some(&Value::List(vec!["x".into(), "y".into()]))
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod builder;
pub mod options;
pub mod value;

use indexmap::IndexMap;
use thiserror::Error;

pub use builder::MapBuilder;
pub use options::{ConvertOptions, TextMode, DEFAULT_ATTRIBUTE_PREFIX, DEFAULT_MAX_DEPTH};
pub use value::{Map, Value};

/// Error domain reported alongside [`ConvertError::code`].
pub const ERROR_DOMAIN: &str = "xmlmap";

/// Opaque tokenizer failure carried by [`ConvertError::MalformedInput`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Attributes of a start tag, in document order.
pub type Attributes = IndexMap<String, String>;

/// Error type produced by a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No input bytes, or the stream ended before any element was seen.
    #[error("input is empty or missing")]
    NilOrEmptyInput,
    /// The tokenizer rejected the document.
    #[error("malformed xml: {0}")]
    MalformedInput(#[source] BoxError),
}

impl ConvertError {
    /// Numeric code within [`ERROR_DOMAIN`].
    pub fn code(&self) -> i64 {
        match self {
            ConvertError::NilOrEmptyInput => 1001,
            ConvertError::MalformedInput(_) => 1002,
        }
    }

    pub fn malformed<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ConvertError::MalformedInput(err.into())
    }
}

/// Structural faults noticed by [`MapBuilder`] itself rather than the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("element <{name}> exceeds the nesting limit of {limit}")]
    TooDeep { name: String, limit: usize },
    #[error("end tag </{0}> without open element")]
    UnexpectedEnd(String),
    #[error("expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },
}

/// Push-style receiver of tokenizer events.
///
/// A tokenizer calls [`element_start`](Self::element_start),
/// [`characters`](Self::characters) and [`element_end`](Self::element_end) in
/// document order, then exactly one of [`stream_end`](Self::stream_end) or
/// [`parse_error`](Self::parse_error).
pub trait XmlEventSink {
    fn element_start(&mut self, name: &str, attributes: Attributes);
    /// Character data of the innermost open element; may arrive in fragments.
    fn characters(&mut self, text: &str);
    fn element_end(&mut self, name: &str);
    fn stream_end(&mut self);
    fn parse_error(&mut self, error: BoxError);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ConvertError::NilOrEmptyInput.code(), 1001);
        let err = ConvertError::malformed("bad tag");
        assert_eq!(err.code(), 1002);
        assert_eq!(err.to_string(), "malformed xml: bad tag");
    }

    #[test]
    fn malformed_exposes_source() {
        let err = ConvertError::malformed(StructureError::Unclosed("a".into()));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "element <a> is never closed");
        assert!(ConvertError::NilOrEmptyInput.source().is_none());
    }
}
