//! Command-line interface for the drawtime utility
//!
//! Provides a CLI to compile timing descriptions into PNG or SVG images,
//! check them and rewrite them canonically.

use anyhow::{anyhow, bail, Result};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::report::{format_error, summary};
use drawtime::core::logging::{init_logging, FORMAT_ENV, LEVEL_ENV};
use drawtime::timing::{CommandRenderer, RasterRenderer, SvgRenderer, TimingDiagram, TimingParser};
use drawtime::{FontLibrary, Parser, Renderer};

/// DrawTime - Draw timing diagrams from text descriptions
#[derive(ClapParser)]
#[command(name = "drawtime")]
#[command(about = "Compile timing-diagram descriptions into PNG or SVG images")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error|off)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a description to an image
    Render {
        /// Input file containing the description (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format; guessed from the output extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// TrueType/OpenType font file used instead of the system fonts
        #[arg(long, conflicts_with = "fixed_metrics")]
        font_file: Option<PathBuf>,

        /// Measure text with fixed metrics; no font files are read
        #[arg(long)]
        fixed_metrics: bool,
    },

    /// Check a description and point at the first error
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Show the parsed diagram
    Inspect {
        /// Input file to inspect (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a description in canonical form
    Fmt {
        /// Input file to format (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Supported output formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG image
    Png,
    /// SVG document
    Svg,
    /// Recorded drawing commands as JSON
    Json,
}

impl OutputFormat {
    /// The format named by an output file's extension, PNG otherwise
    pub fn from_path(path: Option<&Path>) -> Self {
        let extension = path
            .and_then(Path::extension)
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => OutputFormat::Svg,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Png,
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn is_stdout(path: &Option<PathBuf>) -> bool {
    match path {
        None => true,
        Some(path) => path.as_os_str() == "-",
    }
}

/// Main CLI application
pub struct DrawtimeApp {
    parser: TimingParser,
}

impl DrawtimeApp {
    /// Create a new application instance
    pub fn new() -> Self {
        Self {
            parser: TimingParser::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flags
        let log_level = std::env::var(LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("DrawTime v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                input,
                output,
                format,
                font_file,
                fixed_metrics,
            } => {
                let fonts = Self::font_library(font_file.as_deref(), fixed_metrics)?;
                self.render_command(input, output, format, fonts, cli.verbose)
            }
            Commands::Validate { input, color } => self.validate_command(input, color, cli.verbose),
            Commands::Inspect { input, json } => self.inspect_command(input, json),
            Commands::Fmt { input, output } => self.fmt_command(input, output),
        }
    }

    fn font_library(font_file: Option<&Path>, fixed_metrics: bool) -> Result<FontLibrary> {
        match font_file {
            Some(path) => FontLibrary::from_file(path)
                .map_err(|e| anyhow!("Failed to load font file '{}': {}", path.display(), e)),
            None if fixed_metrics => Ok(FontLibrary::fixed()),
            None => Ok(FontLibrary::system()),
        }
    }

    /// Parse `content`, turning a syntax error into a readable report
    fn parse(&self, content: &str) -> Result<TimingDiagram> {
        self.parser
            .parse(content)
            .map_err(|error| anyhow!("{}", format_error(content, &error, false).trim_end()))
    }

    /// Handle the render command
    pub fn render_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        format: Option<OutputFormat>,
        fonts: FontLibrary,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let diagram = self.parse(&content)?;
        let format = format.unwrap_or_else(|| OutputFormat::from_path(output.as_deref()));
        debug!(?format, signals = diagram.signals().len(), "Rendering description");
        if format == OutputFormat::Png
            && is_stdout(&output)
            && crossterm::tty::IsTty::is_tty(&io::stdout())
        {
            bail!("Refusing to write PNG data to a terminal; use --output <file> or --format svg");
        }

        let bytes = match format {
            OutputFormat::Png => RasterRenderer::with_fonts(fonts).render_png(&diagram)?,
            OutputFormat::Svg => SvgRenderer::with_fonts(fonts).render(&diagram)?.into_bytes(),
            OutputFormat::Json => {
                let commands = CommandRenderer::with_fonts(fonts).render(&diagram)?;
                serde_json::to_vec_pretty(&commands)?
            }
        };

        if verbose {
            eprintln!(
                "Rendered {} signals as {:?} ({} bytes)",
                diagram.signals().len(),
                format,
                bytes.len()
            );
        }
        self.write_bytes(output, &bytes)
    }

    /// Determine if we should colorize the output based on color choice
    fn should_colorize(&self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                crossterm::tty::IsTty::is_tty(&io::stdout())
            }
        }
    }

    /// Handle the validate command
    pub fn validate_command(
        &self,
        input: Option<PathBuf>,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.parser.parse(&content) {
            Ok(diagram) => {
                println!("✓ Valid timing diagram with {} signals", diagram.signals().len());
                Ok(())
            }
            Err(error) => {
                print!("{}", format_error(&content, &error, self.should_colorize(color)));
                Err(anyhow!(
                    "Invalid timing diagram ({} on line {})",
                    error.kind,
                    error.line_number
                ))
            }
        }
    }

    /// Handle the inspect command
    pub fn inspect_command(&self, input: Option<PathBuf>, json: bool) -> Result<()> {
        let content = self.read_input(input)?;
        let diagram = self.parse(&content)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&diagram)?);
        } else {
            print!("{}", summary(&diagram));
        }
        Ok(())
    }

    /// Handle the fmt command
    pub fn fmt_command(&self, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
        let content = self.read_input(input)?;
        let diagram = self.parse(&content)?;
        self.write_bytes(output, diagram.to_description().as_bytes())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.as_os_str() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_bytes(&self, output: Option<PathBuf>, content: &[u8]) -> Result<()> {
        match output {
            Some(path) if path.as_os_str() != "-" => fs::write(&path, content)
                .map_err(|e| anyhow!("Failed to write output file '{}': {}", path.display(), e)),
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

impl Default for DrawtimeApp {
    fn default() -> Self {
        Self::new()
    }
}
