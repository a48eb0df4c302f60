//! CLI binary for word-cleaner.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use word_cleaner::{
    convert, convert_stream, fingerprints, format_bytes, handle_json, write_output, CleanupLevel,
    ConversionConfig, ConversionProgressCallback, FileResult, ProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// file. Files complete out of order, so lines are keyed by input index.
struct CliProgressCallback {
    bar: ProgressBar,
    names: Vec<String>,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(names: Vec<String>) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(names.len() as u64);
        bar.set_style(style);
        bar.set_prefix("Cleaning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            names,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("?")
    }

    fn elapsed_ms(&self, index: usize) -> u128 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Cleaning {total_files} files…"))
        ));
    }

    fn on_file_start(&self, index: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(self.name(index).to_string());
    }

    fn on_file_complete(&self, index: usize, _total: usize, cleaned_len: usize) {
        let elapsed_ms = self.elapsed_ms(index);
        self.bar.println(format!(
            "  {} {:<40}  {:>10}  {}",
            green("✓"),
            self.name(index),
            dim(&format_bytes(cleaned_len)),
            dim(&format!("{elapsed_ms}ms")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, _total: usize, error: &str) {
        let elapsed_ms = self.elapsed_ms(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<40}  {}  {}",
            red("✗"),
            self.name(index),
            red(&msg),
            dim(&format!("{elapsed_ms}ms")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files cleaned successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files cleaned  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Clean a file to stdout (moderate level)
  wordclean pasted.htm

  # Clean from stdin
  pbpaste | wordclean --level aggressive

  # Clean to a file
  wordclean report.htm -o report.html

  # Plain semantic HTML, no images or tables
  wordclean --level aggressive --drop-images --drop-tables report.htm

  # Batch: every file into a directory, 4 at a time
  wordclean --out-dir clean/ -c 4 export/*.htm

  # JSON service mode: request in, response out
  echo '{"content":"<p class=MsoNormal>Hi</p>"}' | wordclean --request

  # Does this look like word-processor HTML?
  wordclean --detect pasted.htm

LEVELS:
  basic       drop mso classes/styles and conditional-comment remnants
  moderate    + drop all classes and empty attributes, unwrap div/font,
                keep only color/weight/style/decoration on spans (default)
  aggressive  + drop all styles and non-essential attributes, keep only
                allowlisted tags (p br strong b em i u h1-h6 ul ol li a
                blockquote code pre, tables and img unless dropped)

ENVIRONMENT VARIABLES:
  WORDCLEAN_LEVEL, WORDCLEAN_OUTPUT, WORDCLEAN_OUT_DIR, WORDCLEAN_MAX_BYTES,
  WORDCLEAN_CONCURRENCY, ...   mirror the flags of the same name
  RUST_LOG                     override the log filter (e.g. word_cleaner=debug)
"#;

/// Clean word-processor HTML into minimal, portable HTML.
#[derive(Parser, Debug)]
#[command(
    name = "wordclean",
    version,
    about = "Clean word-processor HTML into minimal, portable HTML",
    long_about = "Strip proprietary markup (mso- styles, Mso classes, o:p elements, conditional \
comments, embedded style sheets) from HTML exported or pasted from a word processor, at one of \
three cleanup levels.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input HTML files. Reads stdin when none are given.
    inputs: Vec<PathBuf>,

    /// Write the cleaned HTML to this file instead of stdout.
    #[arg(short, long, env = "WORDCLEAN_OUTPUT", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Write one cleaned file per input into this directory.
    #[arg(long, env = "WORDCLEAN_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Cleanup level: basic, moderate, aggressive.
    #[arg(short, long, env = "WORDCLEAN_LEVEL", default_value = "moderate")]
    level: CleanupLevel,

    /// Remove image elements (moderate and aggressive).
    #[arg(long, env = "WORDCLEAN_DROP_IMAGES")]
    drop_images: bool,

    /// Remove table markup at the aggressive level.
    #[arg(long, env = "WORDCLEAN_DROP_TABLES")]
    drop_tables: bool,

    /// Keep ordinary comments (conditional-comment markers are still dropped).
    #[arg(long, env = "WORDCLEAN_KEEP_COMMENTS")]
    keep_comments: bool,

    /// Largest accepted input document in bytes.
    #[arg(long, env = "WORDCLEAN_MAX_BYTES", default_value_t = word_cleaner::DEFAULT_MAX_INPUT_BYTES)]
    max_bytes: usize,

    /// Number of files cleaned concurrently in batch mode.
    #[arg(short, long, env = "WORDCLEAN_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Output structured JSON instead of HTML.
    #[arg(long, env = "WORDCLEAN_JSON")]
    json: bool,

    /// Read a JSON request ({"content", "options"}) and print a JSON response.
    #[arg(long, conflicts_with_all = ["detect", "out_dir"])]
    request: bool,

    /// Only report whether the input looks like word-processor HTML.
    #[arg(long, conflicts_with = "out_dir")]
    detect: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WORDCLEAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WORDCLEAN_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, env = "WORDCLEAN_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let batch = cli.out_dir.is_some() || cli.inputs.len() > 1;
    let show_progress = batch && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Request mode ─────────────────────────────────────────────────────
    if cli.request {
        let body = read_single_input(&cli.inputs).await?;
        let config = build_config(&cli, None)?;
        let response = handle_json(&body, &config);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Failed to serialise response")?
        );
        if !response.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ── Detect mode ──────────────────────────────────────────────────────
    if cli.detect {
        return detect(&cli).await;
    }

    // ── Batch mode ───────────────────────────────────────────────────────
    if batch {
        let Some(ref out_dir) = cli.out_dir else {
            bail!("Several inputs need --out-dir to say where the cleaned files go");
        };
        let progress_cb: Option<ProgressCallback> = if show_progress {
            let names = cli.inputs.iter().map(|p| p.display().to_string()).collect();
            Some(CliProgressCallback::new(names) as Arc<dyn ConversionProgressCallback>)
        } else {
            None
        };
        let config = build_config(&cli, progress_cb)?;
        return run_batch(&cli, out_dir, &config).await;
    }

    // ── Single document ──────────────────────────────────────────────────
    let config = build_config(&cli, None)?;
    let document = read_single_input(&cli.inputs).await?;
    let output = convert(&document, &config).context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref output_path) = cli.output {
        write_output(output_path, &output.html)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.html.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !output.html.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        let m = &output.metrics;
        eprintln!(
            "{}  {} → {}  ({}% smaller)  {}ms{}",
            green("✔"),
            format_bytes(m.original_size),
            bold(&format_bytes(m.cleaned_size)),
            m.reduction_percentage,
            m.processing_duration_ms,
            if output.word_origin {
                dim("  word-processor markup detected")
            } else {
                String::new()
            },
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .level(cli.level)
        .preserve_images(!cli.drop_images)
        .preserve_tables(!cli.drop_tables)
        .remove_comments(!cli.keep_comments)
        .max_input_bytes(cli.max_bytes)
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read the only input file, or stdin when no file was given.
async fn read_single_input(inputs: &[PathBuf]) -> Result<String> {
    match inputs {
        [] => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
        [path] => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => bail!("Expected a single input, got {}", inputs.len()),
    }
}

async fn detect(cli: &Cli) -> Result<()> {
    let mut documents = Vec::new();
    if cli.inputs.is_empty() {
        documents.push(("<stdin>".to_string(), read_single_input(&[]).await?));
    }
    for path in &cli.inputs {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push((path.display().to_string(), text));
    }

    let reports: Vec<_> = documents
        .iter()
        .map(|(name, text)| (name.as_str(), fingerprints(text)))
        .collect();

    if cli.json {
        let json: Vec<_> = reports
            .iter()
            .map(|(name, found)| {
                serde_json::json!({
                    "input": name,
                    "isWordContent": !found.is_empty(),
                    "fingerprints": found,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise report")?
        );
        return Ok(());
    }

    for (name, found) in reports {
        if found.is_empty() {
            println!("{}  {}", dim("–"), name);
        } else {
            let list: Vec<String> = found.iter().map(ToString::to_string).collect();
            println!("{}  {}  {}", green("✓"), bold(name), dim(&list.join(", ")));
        }
    }
    Ok(())
}

async fn run_batch(cli: &Cli, out_dir: &Path, config: &ConversionConfig) -> Result<()> {
    let mut results: Vec<FileResult> = Vec::with_capacity(cli.inputs.len());
    let mut stream = convert_stream(cli.inputs.clone(), config);

    while let Some(result) = stream.next().await {
        if let Some(ref output) = result.output {
            let target = out_dir.join(output_name(&result.path, result.index));
            write_output(&target, &output.html)
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }
        results.push(result);
    }
    results.sort_by_key(|r| r.index);

    let failed = results.iter().filter(|r| !r.is_success()).count();

    if cli.json {
        let json = serde_json::to_string_pretty(&results).context("Failed to serialise results")?;
        println!("{json}");
    } else if !cli.quiet && config.progress_callback.is_none() {
        for r in &results {
            match (&r.output, &r.error) {
                (Some(out), _) => eprintln!(
                    "{} {}  {}% smaller",
                    green("✓"),
                    r.path.display(),
                    out.metrics.reduction_percentage
                ),
                (_, Some(e)) => eprintln!("{} {}", red("✗"), e),
                _ => {}
            }
        }
    }

    if failed > 0 {
        bail!("{failed}/{} files failed", results.len());
    }
    Ok(())
}

/// `export/report.htm` → `report.html`.
fn output_name(input: &Path, index: usize) -> PathBuf {
    match input.file_stem() {
        Some(stem) => {
            let mut name = stem.to_owned();
            name.push(".html");
            PathBuf::from(name)
        }
        None => PathBuf::from(format!("document-{index}.html")),
    }
}
