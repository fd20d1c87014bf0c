//! sheetview CLI - spreadsheet upload viewer
//!
//! A command-line front end that loads the first sheet of an .xlsx or .xls
//! workbook and renders it as an HTML page, Markdown, plain text, or JSON.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};
use sheetview::render::{JsonFormat, RenderOptions, LOADING_TEXT};
use sheetview::{DateRendering, ReadOptions, Toast, ToastVariant, Viewer};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Spreadsheet viewer for Excel workbooks
#[derive(Parser)]
#[command(
    name = "sheetview",
    author = "iyulab",
    version,
    about = "View the first sheet of an Excel workbook",
    long_about = "sheetview - Spreadsheet upload viewer.\n\n\
                  Reads .xlsx and .xls workbooks and renders the first sheet as an\n\
                  HTML table page, Markdown, plain text, or JSON."
)]
struct Cli {
    /// Log progress to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a workbook and render the viewer page as HTML
    View {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render only the data table card
        #[arg(long)]
        fragment: bool,

        /// Show date cells as ISO 8601 dates instead of serial numbers
        #[arg(long)]
        iso_dates: bool,
    },

    /// Render the first sheet as a Markdown table
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show date cells as ISO 8601 dates instead of serial numbers
        #[arg(long)]
        iso_dates: bool,
    },

    /// Render the first sheet as a plain text table
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show date cells as ISO 8601 dates instead of serial numbers
        #[arg(long)]
        iso_dates: bool,
    },

    /// Render the first sheet as JSON records
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Show date cells as ISO 8601 dates instead of serial numbers
        #[arg(long)]
        iso_dates: bool,
    },

    /// Show workbook information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Colored stderr logger.
struct CliLogger {
    level: LevelFilter,
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "error".red().bold(),
            Level::Warn => "warn".yellow().bold(),
            Level::Info => "info".green(),
            Level::Debug => "debug".blue(),
            Level::Trace => "trace".dimmed(),
        };
        eprintln!("{} {}", tag, record.args());
    }

    fn flush(&self) {}
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    let level = level_for(verbose);
    let logger = Box::new(CliLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_options(iso_dates: bool) -> ReadOptions {
    let dates = if iso_dates {
        DateRendering::Iso
    } else {
        DateRendering::Serial
    };
    ReadOptions::new().with_dates(dates)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::View {
            input,
            output,
            fragment,
            iso_dates,
        } => {
            let mut viewer = Viewer::with_options(read_options(iso_dates));
            let pb = create_spinner(LOADING_TEXT);

            viewer.select_file(input.display().to_string());
            viewer.finish_read(fs::read(&input))?;

            pb.finish_and_clear();
            for toast in viewer.toasts() {
                print_toast(toast);
            }

            let mut options = RenderOptions::new();
            if fragment {
                options = options.fragment();
            }
            let html = sheetview::render::to_html(&viewer, &options);
            write_output(output.as_ref(), &html)?;

            if let Some(e) = viewer.last_error() {
                return Err(e.to_string().into());
            }
            if let Some(path) = output {
                println!(
                    "{} Rendered {} rows to {}",
                    "✓".green().bold(),
                    viewer.rows().len(),
                    path.display()
                );
            }
        }

        Commands::Markdown {
            input,
            output,
            iso_dates,
        } => {
            let pb = create_spinner("Reading workbook...");

            let result = sheetview::parse_file(&input, &read_options(iso_dates))?;
            pb.set_message("Rendering to Markdown...");

            let markdown = sheetview::render::to_markdown(&result, &RenderOptions::default());

            pb.finish_and_clear();
            write_output(output.as_ref(), &markdown)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to Markdown: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Text {
            input,
            output,
            iso_dates,
        } => {
            let pb = create_spinner("Reading workbook...");

            let result = sheetview::parse_file(&input, &read_options(iso_dates))?;
            pb.set_message("Rendering to text...");

            let text = sheetview::render::to_text(&result);

            pb.finish_and_clear();
            write_output(output.as_ref(), &text)?;

            if let Some(path) = output {
                println!("{} Converted to text: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Json {
            input,
            output,
            compact,
            iso_dates,
        } => {
            let pb = create_spinner("Reading workbook...");

            let result = sheetview::parse_file(&input, &read_options(iso_dates))?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = sheetview::render::to_json(&result, format)?;

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing workbook...");

            let options = ReadOptions::default();
            let workbook = sheetview::read_workbook(&input, &options)?;
            let result = sheetview::records::to_parse_result(&workbook, &options);

            pb.finish_and_clear();

            println!("{}", "Workbook Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Format".bold(), workbook.format);
            println!(
                "{}: {} ({})",
                "Sheets".bold(),
                workbook.sheet_count(),
                workbook.sheet_names.join(", ")
            );

            let meta = &workbook.metadata;
            if let Some(ref title) = meta.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = meta.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref created) = meta.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = meta.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }

            println!("\n{}", "First Sheet".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Name".bold(), result.sheet_name);
            if let Some(range) = workbook.first_sheet.range() {
                println!("{}: {}", "Range".bold(), range.to_a1());
            }
            println!("{}: {}", "Columns".bold(), result.headers.join(", "));
            println!("{}: {}", "Rows".bold(), result.row_count());
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_toast(toast: &Toast) {
    match toast.variant {
        ToastVariant::Default => eprintln!(
            "{} {}: {}",
            "✓".green().bold(),
            toast.title.bold(),
            toast.description
        ),
        ToastVariant::Destructive => eprintln!(
            "{} {}: {}",
            "✗".red().bold(),
            toast.title.red().bold(),
            toast.description
        ),
    }
}

fn print_version() {
    println!("{} {}", "sheetview".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Spreadsheet upload viewer for Excel workbooks");
    println!();
    println!("Supported formats: XLSX, XLS");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(
        style
            .clone()
            .template("{spinner:.blue} {msg}")
            .unwrap_or(style),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
