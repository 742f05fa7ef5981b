use std::error::Error;

use tracing_subscriber::EnvFilter;
use xmlmap::{ConvertOptions, Converter, MainQueue, TextMode};

const XML: &str = r#"<?xml version="1.0"?>
<library name="city">
    <book id="1"><title>Dune</title></book>
    <book id="2"><title>Hyperion</title></book>
    <note>   opened daily   </note>
</library>
"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let mut main_queue = MainQueue::new();
    let options = ConvertOptions::new().with_text_mode(TextMode::Trim);
    let converter = Converter::with_worker(runtime.handle().clone(), options)
        .completion_context(main_queue.handle());

    converter.convert_from_str(Some(XML), |result| match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("serialise failed: {err}"),
        },
        Err(err) => eprintln!("conversion failed [{}]: {err}", err.code()),
    });

    main_queue.blocking_run_next();
    Ok(())
}
