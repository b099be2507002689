//! Policy Navigator CLI.
//!
//! Load a policy document and ask questions in plain English, with
//! page-level citations. One-shot `ask` mode and an interactive `chat`
//! loop.

use clap::Parser;
use policynav_core::{AnswerResult, PolicyNavigator};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Policy Navigator: plain-English questions over a policy document
#[derive(Parser, Debug)]
#[command(name = "policynav", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override retrieval top-k
    #[arg(long)]
    top_k: Option<usize>,

    /// Override the compression ratio
    #[arg(long)]
    ratio: Option<f64>,

    /// Emit the result as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Ask one question against a document
    Ask {
        /// Document to load (UTF-8 text; pages split on form feed)
        document: PathBuf,
        /// The question, in plain English
        question: Vec<String>,
    },
    /// Load a document and answer questions interactively
    Chat {
        /// Document to load
        document: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = policynav_core::load_config(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(top_k) = cli.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(ratio) = cli.ratio {
        config.compression.ratio = ratio;
    }

    let mut navigator = PolicyNavigator::new(config)
        .map_err(|e| anyhow::anyhow!("Cannot start Policy Navigator: {}", e))?;

    match cli.command {
        Commands::Ask { document, question } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                anyhow::bail!("Please provide a question");
            }
            load(&mut navigator, &document, cli.quiet).await?;
            let result = ask(&navigator, &question).await?;
            print_result(&result, cli.json);
        }
        Commands::Chat { document } => {
            load(&mut navigator, &document, cli.quiet).await?;
            chat_loop(&navigator, cli.json).await?;
        }
    }

    Ok(())
}

async fn load(
    navigator: &mut PolicyNavigator,
    document: &std::path::Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let stats = navigator
        .load_document(document)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load document: {}", e))?;
    if !quiet {
        eprintln!(
            "Loaded {} ({} pages, {} chunks)",
            stats.path.display(),
            stats.pages,
            stats.chunks
        );
    }
    Ok(())
}

async fn ask(navigator: &PolicyNavigator, question: &str) -> anyhow::Result<AnswerResult> {
    navigator
        .ask(question)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to answer question: {}", e))
}

fn json_payload(result: &AnswerResult) -> serde_json::Value {
    serde_json::json!({
        "answer": result.answer,
        "citations": result.citations,
        "relevant_pages": result.relevant_pages,
    })
}

fn print_result(result: &AnswerResult, as_json: bool) {
    if as_json {
        println!("{}", json_payload(result));
        return;
    }

    println!("{}", result.answer.trim());
    if !result.citations.is_empty() {
        println!("\nSources:");
        for citation in &result.citations {
            println!("  [Page {}] {}", citation.page, citation.preview);
        }
        let pages: Vec<String> = result.relevant_pages.iter().map(|p| p.to_string()).collect();
        println!("Relevant pages: {}", pages.join(", "));
    }
}

async fn chat_loop(navigator: &PolicyNavigator, as_json: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    loop {
        print!("question> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match ask(navigator, question).await {
            Ok(result) => print_result(&result, as_json),
            Err(e) => eprintln!("{}", e),
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use policynav_core::Citation;

    #[test]
    fn json_payload_carries_answer_citations_and_pages() {
        let result = AnswerResult {
            answer: "- Twenty days of leave.".into(),
            citations: vec![Citation {
                page: 1,
                preview: "Employees must take 20 days leave annually.".into(),
            }],
            relevant_pages: vec![1],
        };

        let payload = json_payload(&result);
        assert_eq!(payload["answer"], "- Twenty days of leave.");
        assert_eq!(payload["citations"][0]["page"], 1);
        assert_eq!(
            payload["citations"][0]["preview"],
            "Employees must take 20 days leave annually."
        );
        assert_eq!(payload["relevant_pages"], serde_json::json!([1]));
    }
}
