//! Asynchronous XML to map conversion.
//!
//! A [`Converter`] tokenizes and folds a document on a tokio blocking worker,
//! then hands the outcome to a completion handler on a designated
//! [`CompletionContext`]. The handler runs exactly once with either the
//! converted [`Value`] or a [`ConvertError`].
//!
//! ```rust,no_run
//! use xmlmap::{Converter, ConvertOptions, MainQueue};
//!
//! let runtime = tokio::runtime::Runtime::new().expect("runtime");
//! let mut main_queue = MainQueue::new();
//! let converter = Converter::with_worker(runtime.handle().clone(), ConvertOptions::default())
//!     .completion_context(main_queue.handle());
//!
//! converter.convert_from_str(Some("<root><item>x</item><item>y</item></root>"), |result| {
//!     match result {
//!         Ok(value) => println!("items: {:?}", value.get("item")),
//!         Err(err) => eprintln!("conversion failed ({}): {err}", err.code()),
//!     }
//! });
//!
//! // Completion handlers run here, on the thread owning the queue.
//! main_queue.blocking_run_next();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod dispatch;

use std::sync::Arc;

use bytes::Bytes;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub use xmlmap_core as core;
pub use xmlmap_xml as xml;

pub use dispatch::{CompletionContext, Job, MainQueue, MainQueueHandle, RuntimeContext};
pub use xmlmap_core::{ConvertError, ConvertOptions, Map, TextMode, Value, ERROR_DOMAIN};

/// Outcome delivered to completion handlers.
pub type ConvertResult = Result<Value, ConvertError>;

/// Runs conversions on a worker and reports them to a completion context.
///
/// Each call owns its parse state, so one converter can serve any number of
/// concurrent conversions.
#[derive(Clone)]
pub struct Converter {
    options: ConvertOptions,
    worker: Handle,
    completion: Arc<dyn CompletionContext>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Converter whose worker and completion context are the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_worker(Handle::current(), options)
    }

    /// Converter running on `worker`; completions are spawned as tasks on the
    /// same runtime until [`completion_context`](Self::completion_context)
    /// replaces them.
    pub fn with_worker(worker: Handle, options: ConvertOptions) -> Self {
        let completion = Arc::new(RuntimeContext::new(worker.clone()));
        Self {
            options,
            worker,
            completion,
        }
    }

    /// Deliver completions through `context`.
    pub fn completion_context<C: CompletionContext>(mut self, context: C) -> Self {
        self.completion = Arc::new(context);
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `data` and report the outcome to `completion`.
    ///
    /// Absent or zero-length data completes with
    /// [`ConvertError::NilOrEmptyInput`] without starting the worker; the
    /// handler still runs on the completion context.
    ///
    /// # Guarantees
    ///
    /// The handler is handed to the completion context exactly once. If the
    /// worker runtime has shut down and drops the job, the conversion runs on
    /// the thread that dropped it and is dispatched from there. A context that
    /// can no longer run jobs (a dropped [`MainQueue`], a shut down
    /// [`RuntimeContext`]) discards the handler and logs a warning.
    pub fn convert_from_bytes<F>(&self, data: Option<Bytes>, completion: F)
    where
        F: FnOnce(ConvertResult) + Send + 'static,
    {
        let context = Arc::clone(&self.completion);
        let Some(data) = data.filter(|data| !data.is_empty()) else {
            debug!("no xml input supplied");
            context.dispatch(Box::new(move || {
                completion(Err(ConvertError::NilOrEmptyInput))
            }));
            return;
        };
        debug!(bytes = data.len(), "scheduling xml conversion");
        let pending = PendingConversion {
            data,
            options: self.options.clone(),
            context,
            completion: Some(Box::new(completion)),
        };
        self.worker.spawn_blocking(move || pending.run());
    }

    /// Encode `text` as UTF-8 and convert it like
    /// [`convert_from_bytes`](Self::convert_from_bytes).
    ///
    /// A missing string is reported the same way as missing data.
    pub fn convert_from_str<F>(&self, text: Option<&str>, completion: F)
    where
        F: FnOnce(ConvertResult) + Send + 'static,
    {
        let data = text.map(|text| Bytes::copy_from_slice(text.as_bytes()));
        self.convert_from_bytes(data, completion);
    }
}

type Completion = Box<dyn FnOnce(ConvertResult) + Send + 'static>;

/// A conversion travelling to the worker; delivers on drop if never run.
struct PendingConversion {
    data: Bytes,
    options: ConvertOptions,
    context: Arc<dyn CompletionContext>,
    completion: Option<Completion>,
}

impl PendingConversion {
    fn run(mut self) {
        self.deliver();
    }

    fn deliver(&mut self) {
        if let Some(completion) = self.completion.take() {
            let result = xmlmap_xml::parse_bytes(&self.data, &self.options);
            self.context.dispatch(Box::new(move || completion(result)));
        }
    }
}

impl Drop for PendingConversion {
    fn drop(&mut self) {
        if self.completion.is_some() {
            warn!("worker runtime dropped the conversion; converting on the current thread");
            self.deliver();
        }
    }
}

/// Convert `data` with default options on the current runtime.
///
/// # Panics
///
/// Panics when called outside of a tokio runtime.
pub fn convert_from_bytes<F>(data: Option<Bytes>, completion: F)
where
    F: FnOnce(ConvertResult) + Send + 'static,
{
    Converter::new(ConvertOptions::default()).convert_from_bytes(data, completion);
}

/// Convert `text` with default options on the current runtime.
///
/// # Panics
///
/// Panics when called outside of a tokio runtime.
pub fn convert_from_str<F>(text: Option<&str>, completion: F)
where
    F: FnOnce(ConvertResult) + Send + 'static,
{
    Converter::new(ConvertOptions::default()).convert_from_str(text, completion);
}
