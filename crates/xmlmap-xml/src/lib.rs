//! Tokenize XML with quick-xml and fold it into xmlmap values.
//!
//! ```
//! use xmlmap_core::{ConvertOptions, Value};
//!
//! let value = xmlmap_xml::parse_str(r#"<a id="1"></a>"#, &ConvertOptions::default())
//!     .expect("convert");
//! assert_eq!(value.get("attribute_id"), Some(&Value::from("1")));
//! ```

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, trace};
use xmlmap_core::{Attributes, ConvertError, ConvertOptions, MapBuilder, Value, XmlEventSink};

/// Tokenizer failures handed to [`XmlEventSink::parse_error`].
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("unexpected end of input with {0} element(s) still open")]
    UnexpectedEof(usize),
}

/// Convert an XML string in one synchronous pass.
pub fn parse_str(xml: &str, options: &ConvertOptions) -> Result<Value, ConvertError> {
    parse_bytes(xml.as_bytes(), options)
}

/// Convert raw XML bytes in one synchronous pass.
///
/// Zero-length input fails with [`ConvertError::NilOrEmptyInput`] before the
/// tokenizer runs.
pub fn parse_bytes(data: &[u8], options: &ConvertOptions) -> Result<Value, ConvertError> {
    if data.is_empty() {
        debug!("refusing empty xml input");
        return Err(ConvertError::NilOrEmptyInput);
    }
    debug!(bytes = data.len(), "converting xml document");
    let mut builder = MapBuilder::new(options.clone());
    tokenize(data, &mut builder);
    builder.finish()
}

/// Drive `sink` with the events of the document read from `input`.
///
/// Empty tags are reported as a start followed by an end. Comments,
/// processing instructions, declarations and DOCTYPE are skipped. The call
/// ends with exactly one of `stream_end` or `parse_error`.
pub fn tokenize<R, S>(input: R, sink: &mut S)
where
    R: BufRead,
    S: XmlEventSink + ?Sized,
{
    let mut reader = Reader::from_reader(input);
    reader.trim_text(false);
    reader.expand_empty_elements(true);
    reader.check_end_names(true);
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        let step = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                start_element(&reader, &e, sink)
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                let qname = e.name();
                reader
                    .decoder()
                    .decode(qname.as_ref())
                    .map(|name| sink.element_end(&name))
            }
            Ok(Event::Text(e)) => e.unescape().map(|text| sink.characters(&text)),
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                reader
                    .decoder()
                    .decode(&raw)
                    .map(|text| sink.characters(&text))
            }
            Ok(Event::Eof) => {
                if depth > 0 {
                    sink.parse_error(Box::new(XmlError::UnexpectedEof(depth)));
                } else {
                    sink.stream_end();
                }
                return;
            }
            Ok(other) => {
                trace!(event = ?other, "skipping xml event");
                Ok(())
            }
            Err(err) => Err(err),
        };
        if let Err(err) = step {
            debug!(position = reader.buffer_position(), error = %err, "xml tokenizer failed");
            sink.parse_error(Box::new(XmlError::from(err)));
            return;
        }
        buf.clear();
    }
}

fn start_element<R, S>(
    reader: &Reader<R>,
    event: &BytesStart<'_>,
    sink: &mut S,
) -> Result<(), quick_xml::Error>
where
    S: XmlEventSink + ?Sized,
{
    let decoder = reader.decoder();
    let qname = event.name();
    let name = decoder.decode(qname.as_ref())?;
    let mut attributes = Attributes::new();
    for attr in event.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    sink.element_start(&name, attributes);
    Ok(())
}
