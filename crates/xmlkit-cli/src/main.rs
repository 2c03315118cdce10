//! xmlkit CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "xmlkit")]
#[command(version)]
#[command(about = "Inspect and build XML documents", long_about = None)]
struct Cli {
    /// TOML configuration file (strategy order, parser and xmlize settings)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a document and print it
    Create {
        /// Namespace URI of the document
        #[arg(short = 'n', long)]
        namespace: Option<String>,

        /// Qualified name of the root element
        #[arg(short = 'r', long)]
        root: Option<String>,
    },

    /// Parse a file and report whether it is well-formed
    Status {
        /// Input file (use '-' for stdin)
        input: String,
    },

    /// Print the text content of a parsed file
    Text {
        /// Input file (use '-' for stdin)
        input: String,

        /// Collapse whitespace runs outside xml:space="preserve"
        #[arg(long)]
        normalize: bool,
    },

    /// Remove every tag from a file, keeping the text between them
    StripTags {
        /// Input file (use '-' for stdin)
        input: String,
    },

    /// Convert a JSON file to XML
    Xmlize {
        /// Input JSON file (use '-' for stdin)
        input: String,

        /// Name of the root element
        #[arg(short = 't', long, default_value = "root")]
        tag: String,

        /// Indent nested elements with three spaces
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmlkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let kit = commands::build_kit(cli.config.as_deref())?;

    match cli.command {
        Commands::Create { namespace, root } => {
            commands::create::execute(&kit, namespace.as_deref(), root.as_deref())
        }
        Commands::Status { input } => commands::status::execute(&kit, &input),
        Commands::Text { input, normalize } => commands::text::execute(&kit, &input, normalize),
        Commands::StripTags { input } => commands::strip_tags::execute(&kit, &input),
        Commands::Xmlize { input, tag, pretty } => {
            commands::xmlize::execute(&kit, commands::xmlize::XmlizeArgs { input, tag, pretty })
        }
    }
}
