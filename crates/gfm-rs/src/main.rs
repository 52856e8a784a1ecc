//! Format GFM prediction queries and send them to the inference backend.
//!
//! Backend settings come from flags or the `GFM_LLM_*` environment
//! variables (a `.env` file in the working directory is loaded first).
//!
//! # Examples
//!
//! ```sh
//! # What the system supports
//! gfm capabilities
//!
//! # Print the formatted query for an EFP request
//! gfm query --task EFP --chromosome 7 --start 1000000 --end 1050000 \
//!   --cell-type K562 --modality "Additional TF-bindings"
//!
//! # Same, but forward it to the backend and print the reply
//! GFM_LLM_BASE_URL=http://localhost:8001/v1 gfm query --task EFP ... --send
//!
//! # Free-form question through the system prompt
//! gfm chat --user "What does a Moderate confidence level mean?"
//! ```

use std::io::{self, Read};
use std::process;

use clap::{Parser, Subcommand};
use gfm_rs::cli::{GatewayArgs, LogArgs};
use gfm_rs::prelude::*;

/// Format GFM prediction queries and send them to the inference backend.
#[derive(Parser)]
#[command(name = "gfm", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Print task types, modality catalog, and constraints as JSON
    Capabilities,

    /// Validate and format a prediction query
    Query {
        /// Task type: EFP, GEP, or EAP (anything else uses the generic template)
        #[arg(long)]
        task: String,

        /// Chromosome: 1-22, X, or Y
        #[arg(long)]
        chromosome: String,

        /// Start coordinate (bp)
        #[arg(long, allow_negative_numbers = true)]
        start: i64,

        /// End coordinate (bp)
        #[arg(long, allow_negative_numbers = true)]
        end: i64,

        /// Cell type
        #[arg(long)]
        cell_type: String,

        /// Modality (repeatable, order is kept)
        #[arg(long = "modality")]
        modalities: Vec<String>,

        /// Path to ATAC-seq data
        #[arg(long)]
        atac_seq_path: Option<String>,

        /// Free text to send in place of the default query preamble
        #[arg(long)]
        message: Option<String>,

        /// Forward the query to the backend and print the reply
        #[arg(long)]
        send: bool,
    },

    /// Send a free-form message with the system prompt
    Chat {
        /// User message
        #[arg(long)]
        user: Option<String>,

        /// Read the message (or extra context) from stdin
        #[arg(long)]
        stdin: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    cli.log.to_config().init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Capabilities => {
            println!("{}", serde_json::to_string_pretty(capabilities())?);
        }

        Command::Query {
            task,
            chromosome,
            start,
            end,
            cell_type,
            modalities,
            atac_seq_path,
            message,
            send,
        } => {
            let request = PredictionRequest {
                task_type: task,
                chromosome,
                start,
                end,
                cell_type,
                modalities: (!modalities.is_empty()).then_some(modalities),
                atac_seq_path,
                user_message: message,
            };

            if send {
                let assistant = Assistant::new(LazyGateway::new(cli.gateway.to_config()));
                let reply = assistant.predict(&request, vec![]).await?;
                println!("{reply}");
            } else {
                let formatted = request.format_query()?;
                eprintln!("task: {} ({})", formatted.task_type, formatted.task_type.name());
                println!("{}", formatted.query);
            }
        }

        Command::Chat { user, stdin } => {
            let content = build_user_content(user, stdin)?;
            let assistant = Assistant::new(LazyGateway::new(cli.gateway.to_config()));
            let reply = assistant.chat(vec![Message::user(content)]).await?;
            println!("{reply}");
        }
    }
    Ok(())
}

fn build_user_content(user: Option<String>, stdin: bool) -> anyhow::Result<String> {
    let piped = if stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Some(buf)
    } else {
        None
    };

    match (user, piped) {
        (Some(msg), Some(piped)) => Ok(format!("{msg}\n\n{piped}")),
        (Some(msg), None) => Ok(msg),
        (None, Some(piped)) => Ok(piped),
        (None, None) => anyhow::bail!("provide --user, --stdin, or both"),
    }
}
