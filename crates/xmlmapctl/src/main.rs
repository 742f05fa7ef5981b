use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xmlmapctl::cmd_convert;
use xmlmapctl::cmd_inspect;
use xmlmapctl::common::ConvertFlags;

#[derive(Parser, Debug)]
#[command(name = "xmlmapctl", version, about = "Convert XML documents into ordered maps")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// XML file to read; stdin when omitted or `-`
    path: Option<PathBuf>,
    /// Trim leading/trailing whitespace of text-only elements
    #[arg(long)]
    trim_text: bool,
    /// Prefix for attribute keys (default `attribute_`)
    #[arg(long)]
    attribute_prefix: Option<String>,
}

impl ConvertArgs {
    fn flags(&self) -> ConvertFlags {
        ConvertFlags {
            trim_text: self.trim_text,
            attribute_prefix: self.attribute_prefix.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert a document and print it as JSON
    Convert {
        #[command(flatten)]
        args: ConvertArgs,
        /// Single-line JSON instead of pretty printing
        #[arg(long)]
        compact: bool,
    },
    /// List the top-level keys of the converted document
    Inspect {
        #[command(flatten)]
        args: ConvertArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { verbose, json, cmd } = Cli::parse();

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cmd {
        Cmd::Convert { args, compact } => {
            let flags = args.flags();
            cmd_convert::run(args.path, flags, compact).await?
        }
        Cmd::Inspect { args } => {
            let flags = args.flags();
            cmd_inspect::run(args.path, flags, json).await?
        }
    };

    Ok(())
}
