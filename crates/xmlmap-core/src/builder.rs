//! Stack-of-frames accumulator turning tokenizer events into a [`Value`].

use tracing::{debug, trace, warn};

use crate::{
    Attributes, BoxError, ConvertError, ConvertOptions, Map, StructureError, Value, XmlEventSink,
};

/// One open element awaiting its end tag.
#[derive(Debug)]
struct Frame {
    tag_name: String,
    attributes: Attributes,
    children: Map,
    text: String,
}

impl Frame {
    fn new(tag_name: &str, attributes: Attributes) -> Self {
        Frame {
            tag_name: tag_name.to_string(),
            attributes,
            children: Map::new(),
            text: String::new(),
        }
    }

    /// Attributes (prefixed) followed by children; a frame with neither
    /// collapses to its text. Text next to attributes or children is dropped.
    fn materialize(self, options: &ConvertOptions) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::Text(options.text_mode().apply(self.text));
        }
        let prefix = options.attribute_prefix();
        let mut map = Map::with_capacity(self.attributes.len() + self.children.len());
        for (name, value) in self.attributes {
            map.insert(format!("{prefix}{name}"), Value::Text(value));
        }
        for (key, value) in self.children {
            map.insert(key, value);
        }
        Value::Map(map)
    }
}

/// Builds one converted document from a single event stream.
///
/// Each builder owns its stack; run one per document and call
/// [`finish`](Self::finish) to take the outcome.
#[derive(Debug)]
pub struct MapBuilder {
    options: ConvertOptions,
    stack: Vec<Frame>,
    root: Option<Value>,
    outcome: Option<Result<Value, ConvertError>>,
    elements: usize,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl MapBuilder {
    pub fn new(options: ConvertOptions) -> Self {
        MapBuilder {
            options,
            stack: Vec::new(),
            root: None,
            outcome: None,
            elements: 0,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether `stream_end` or `parse_error` has already settled the outcome.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Take the outcome, treating a stream that was never ended as ended now.
    pub fn finish(mut self) -> Result<Value, ConvertError> {
        if self.outcome.is_none() {
            self.stream_end();
        }
        self.outcome.unwrap_or(Err(ConvertError::NilOrEmptyInput))
    }

    fn fail(&mut self, error: ConvertError) {
        self.stack.clear();
        self.root = None;
        self.outcome = Some(Err(error));
    }

    fn accepting(&self) -> bool {
        self.outcome.is_none() && self.root.is_none()
    }
}

impl XmlEventSink for MapBuilder {
    fn element_start(&mut self, name: &str, attributes: Attributes) {
        if !self.accepting() {
            trace!(name, "ignoring element after document root");
            return;
        }
        let limit = self.options.max_depth();
        if self.stack.len() >= limit {
            let err = StructureError::TooDeep {
                name: name.to_string(),
                limit,
            };
            self.fail(ConvertError::malformed(err));
            return;
        }
        trace!(name, depth = self.stack.len(), "element start");
        self.elements += 1;
        self.stack.push(Frame::new(name, attributes));
    }

    fn characters(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.text.push_str(text);
        }
    }

    fn element_end(&mut self, name: &str) {
        if !self.accepting() {
            return;
        }
        let Some(mut frame) = self.stack.pop() else {
            warn!(name, "end tag without open element");
            self.fail(ConvertError::malformed(StructureError::UnexpectedEnd(
                name.to_string(),
            )));
            return;
        };
        if frame.tag_name != name {
            let err = StructureError::MismatchedEnd {
                expected: std::mem::take(&mut frame.tag_name),
                found: name.to_string(),
            };
            self.fail(ConvertError::malformed(err));
            return;
        }
        trace!(name, depth = self.stack.len(), "element end");
        let tag_name = std::mem::take(&mut frame.tag_name);
        let value = frame.materialize(&self.options);
        match self.stack.last_mut() {
            Some(parent) => Value::insert_child(&mut parent.children, tag_name, value),
            None => self.root = Some(value),
        }
    }

    fn stream_end(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = match (self.root.take(), self.stack.last()) {
            (Some(value), _) => Ok(value),
            (None, Some(open)) => Err(ConvertError::malformed(StructureError::Unclosed(
                open.tag_name.clone(),
            ))),
            (None, None) => Err(ConvertError::NilOrEmptyInput),
        };
        self.stack.clear();
        match &outcome {
            Ok(_) => debug!(elements = self.elements, "document converted"),
            Err(err) => debug!(error = %err, "document rejected"),
        }
        self.outcome = Some(outcome);
    }

    fn parse_error(&mut self, error: BoxError) {
        if self.outcome.is_some() {
            return;
        }
        debug!(error = %error, "tokenizer reported malformed input");
        self.fail(ConvertError::MalformedInput(error));
    }
}
