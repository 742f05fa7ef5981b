use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use tracing::debug;
use xmlmap::{ConvertOptions, Converter, MainQueue, TextMode, Value};

/// Conversion flags shared by subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertFlags {
    pub trim_text: bool,
    pub attribute_prefix: Option<String>,
}

impl ConvertFlags {
    pub fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new();
        if self.trim_text {
            options = options.with_text_mode(TextMode::Trim);
        }
        if let Some(prefix) = &self.attribute_prefix {
            options = options.with_attribute_prefix(prefix.clone());
        }
        options
    }
}

pub fn is_stdin(path: Option<&Path>) -> bool {
    path.map_or(true, |path| path == Path::new("-"))
}

/// Read the document from `path`, or stdin when absent or `-`.
pub async fn read_input(path: Option<&Path>) -> Result<Bytes> {
    let data = match path {
        Some(path) if !is_stdin(Some(path)) => tokio::fs::read(path)
            .await
            .with_context(|| format!("read xml from {}", path.display()))?,
        _ => {
            let mut data = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut data)
                .await
                .context("read xml from stdin")?;
            data
        }
    };
    Ok(Bytes::from(data))
}

/// Convert on a blocking worker and receive the completion on this task.
pub async fn convert(data: Bytes, options: ConvertOptions) -> Result<Value> {
    let mut main_queue = MainQueue::new();
    let converter = Converter::new(options).completion_context(main_queue.handle());
    let (tx, rx) = oneshot::channel();
    debug!(bytes = data.len(), "submitting document");
    converter.convert_from_bytes(Some(data), move |result| {
        let _ = tx.send(result);
    });
    main_queue.run_next().await;
    let result = rx.await.context("conversion completion dropped")?;
    result.map_err(|err| {
        anyhow::Error::new(err).context(format!("convert xml (domain {})", xmlmap::ERROR_DOMAIN))
    })
}

pub fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_options() {
        let flags = ConvertFlags {
            trim_text: true,
            attribute_prefix: Some("@".into()),
        };
        let options = flags.options();
        assert_eq!(options.text_mode(), TextMode::Trim);
        assert_eq!(options.attribute_prefix(), "@");

        let defaults = ConvertFlags {
            trim_text: false,
            attribute_prefix: None,
        }
        .options();
        assert_eq!(defaults, ConvertOptions::default());
    }

    #[test]
    fn dash_means_stdin() {
        assert!(is_stdin(None));
        assert!(is_stdin(Some(Path::new("-"))));
        assert!(!is_stdin(Some(Path::new("doc.xml"))));
    }

    #[tokio::test]
    async fn convert_reports_errors() {
        let value = convert(Bytes::from_static(b"<a>hi</a>"), ConvertOptions::default())
            .await
            .expect("converted");
        assert_eq!(value, Value::from("hi"));

        let err = convert(Bytes::new(), ConvertOptions::default())
            .await
            .unwrap_err();
        let cause = err.root_cause().to_string();
        assert_eq!(cause, "input is empty or missing");
    }

    #[tokio::test]
    async fn reads_file_input() {
        let path = std::env::temp_dir().join(format!("xmlmapctl-read-{}.xml", std::process::id()));
        tokio::fs::write(&path, b"<a/>").await.unwrap();
        let data = read_input(Some(path.as_path())).await.expect("read");
        assert_eq!(&data[..], b"<a/>");
        tokio::fs::remove_file(&path).await.unwrap();

        let missing = std::env::temp_dir().join("xmlmapctl-missing-input.xml");
        assert!(read_input(Some(missing.as_path())).await.is_err());
    }
}
