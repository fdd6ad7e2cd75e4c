use clap::{Parser, Subcommand};
use inkpress::{config, output, publish, scan};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(about = "Batch publisher for hand-authored HTML document trees")]
#[command(long_about = "\
Batch publisher for hand-authored HTML document trees

Your filesystem is the submission queue. Authors drop document folders into
the inbox; each run moves assets into the published tree under immutable
version-numbered names, rewrites documents to reference them, stamps
creation/update dates, and embeds a navigation index into every page.

Inbox structure:

  inbox/
  ├── config.toml            # Site config (optional)
  ├── style.css              # Shared assets: immediate files of the inbox
  ├── script.js              #   root, versioned into the published root
  ├── news.2024.launch/      # Document folder (dots = hierarchy separators)
  │   ├── i.html             # Submission (≤1 byte = delete this document)
  │   ├── local.js           # Per-document script (optional)
  │   └── img.png            # Local assets, versioned into news/2024/launch/
  └── about/
      └── i.html

Runs are idempotent: a crash mid-run leaves old and new files coexisting,
and the next run converges. Run one invocation at a time per tree.")]
#[command(version = version_string())]
struct Cli {
    /// Inbox directory holding submissions
    #[arg(long, default_value = "inbox", global = true)]
    inbox: PathBuf,

    /// Published tree the documents are served from
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one full ingestion pass: shared assets, classify, publish
    Run,
    /// Print what a run would do, as JSON, without touching anything
    Plan,
    /// Validate inbox entries without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run => {
            let config = config::load_config(&cli.inbox)?;
            let today = jiff::Zoned::now().strftime("%Y-%m-%d").to_string();
            let report = publish::run_once(&cli.inbox, &cli.site, &config, &today)?;
            output::print_run(&report);
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Plan => {
            let config = config::load_config(&cli.inbox)?;
            let preview = scan::preview(&cli.inbox, &cli.site, &config)?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let config = config::load_config(&cli.inbox)?;
            let preview = scan::preview(&cli.inbox, &cli.site, &config)?;
            output::print_preview(&preview);
            let invalid = preview
                .docs
                .iter()
                .filter(|d| d.kind == scan::EntryKind::Invalid)
                .count();
            if invalid == 0 {
                println!("Inbox is valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{invalid} invalid entries");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}
