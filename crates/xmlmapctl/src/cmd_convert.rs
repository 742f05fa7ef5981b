use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::common::{self, ConvertFlags};

pub async fn run(input: Option<PathBuf>, flags: ConvertFlags, compact: bool) -> Result<()> {
    let data = common::read_input(input.as_deref()).await?;
    info!(bytes = data.len(), "read xml input");
    let value = common::convert(data, flags.options())
        .await
        .with_context(|| match &input {
            Some(path) => format!("convert {}", path.display()),
            None => "convert stdin".to_string(),
        })?;
    common::print_json(&value, compact)
}
