//! CLI entry point for `email-unpack`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use email_unpack::{
    BodyPolicy, ExtractOptions, ExtractionManifest, Extractor, InputMode, Summary, load_input,
    summarize,
};

#[derive(Parser)]
#[command(name = "email-unpack", version, about = "Unpack MIME email messages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract bodies, images and attachments into a directory
    Extract {
        /// File holding the message (raw, base64 or JSON with `raw_email`)
        file: PathBuf,

        /// Output directory
        #[arg(default_value = "decoded_email_content")]
        output: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,

        /// Keep the first text/HTML body instead of the last
        #[arg(long)]
        first_body_wins: bool,

        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a summary without writing files
    Summary {
        file: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
#[group(multiple = false)]
struct ModeArgs {
    /// Treat the input as base64-encoded
    #[arg(long)]
    base64: bool,

    /// Treat the input as a raw message, skipping detection
    #[arg(long)]
    raw: bool,
}

impl ModeArgs {
    const fn mode(&self) -> InputMode {
        if self.base64 {
            InputMode::Base64
        } else if self.raw {
            InputMode::Raw
        } else {
            InputMode::Auto
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            file,
            output,
            mode,
            first_body_wins,
            json,
        } => cmd_extract(&file, output, mode.mode(), first_body_wins, json),
        Commands::Summary { file, mode, json } => cmd_summary(&file, mode.mode(), json),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_extract(
    file: &Path,
    output: PathBuf,
    mode: InputMode,
    first_body_wins: bool,
    json: bool,
) -> anyhow::Result<()> {
    let input = load_input(file)?;
    let policy = if first_body_wins {
        BodyPolicy::FirstWins
    } else {
        BodyPolicy::LastWins
    };
    let options = ExtractOptions::default()
        .with_input_mode(input.mode(mode))
        .with_body_policy(policy);

    let manifest = Extractor::new(&output)
        .with_options(options)
        .extract_input(&input.content)
        .with_context(|| format!("Extraction of '{}' failed", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        print_manifest(&manifest, &output);
    }

    if manifest.text_body.is_none() && manifest.html_body.is_none() {
        anyhow::bail!("No text or HTML body found in '{}'", file.display());
    }
    Ok(())
}

fn cmd_summary(file: &Path, mode: InputMode, json: bool) -> anyhow::Result<()> {
    let input = load_input(file)?;
    let options = ExtractOptions::default().with_input_mode(input.mode(mode));
    let summary = summarize(&input.content, &options)
        .with_context(|| format!("Could not summarize '{}'", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_manifest(manifest: &ExtractionManifest, output: &Path) {
    println!("Output directory: {}", output.display());
    println!(
        "Bodies: text={} html={}",
        manifest.text_body.is_some(),
        manifest.html_body.is_some()
    );
    println!("Files extracted: {}", manifest.entries.len());
    for entry in &manifest.entries {
        println!(
            "  {:<40} {:<15} {:>10} bytes  (part {})",
            entry.name,
            entry.role.to_string(),
            entry.size_bytes,
            entry.part_index
        );
    }
    if !manifest.failures.is_empty() {
        println!("Not extracted: {}", manifest.failures.len());
        for failure in &manifest.failures {
            let part = failure
                .part_index
                .map_or_else(|| "-".to_string(), |i| i.to_string());
            println!("  part {part}: {}", failure.message);
        }
    }
}

fn print_summary(summary: &Summary) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".into());
    let h = &summary.headers;
    println!("From:       {}", show(&h.from));
    println!("To:         {}", show(&h.to));
    println!("Subject:    {}", show(&h.subject));
    println!("Date:       {}", show(&h.date));
    println!("Message-ID: {}", show(&h.message_id));
    println!();
    println!(
        "Text body: {}   HTML body: {}",
        summary.body.has_text, summary.body.has_html
    );
    if let Some(ref preview) = summary.body.text_preview {
        println!("Text preview: {preview}");
    }
    println!();
    println!(
        "Attachments: {} ({} images)",
        summary.attachments.count, summary.attachments.images
    );
    for file in &summary.attachments.files {
        println!(
            "  {:<10} {:<25} {}",
            file.kind.to_string(),
            file.content_type,
            file.filename.as_deref().unwrap_or("-")
        );
    }
}
