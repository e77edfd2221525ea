//! rusty-txf CLI - convert a 1099-B statement into a TXF file
//!
//! ## Example Usage
//!
//! ```bash
//! # Convert a PDF statement (needs pdftotext on PATH)
//! rusty-txf GOOG.pdf GOOG.txf
//!
//! # Convert already extracted text, forcing the checkbox layout
//! rusty-txf statement.txt out.txf --layout checkbox
//!
//! # Show per-record parsing
//! RUST_LOG=info rusty-txf GOOG.pdf GOOG.txf --verbose
//! ```

use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use rusty_txf::error::{Result as TxfResult, TxfError};
use rusty_txf::extract;
use rusty_txf::parser::Layout;
use rusty_txf::record::DATE_FORMAT;
use rusty_txf::{check_output_path, convert, write_output, ConvertOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// rusty-txf: Convert brokerage 1099-B statements to TXF
#[derive(Parser)]
#[command(name = "rusty-txf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Convert brokerage 1099-B statements to TXF", long_about = None)]
struct Cli {
    /// Statement to convert (.pdf, or .txt already run through pdftotext -raw)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// TXF file to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Statement layout (auto, checkbox, self-contained)
    #[arg(short, long)]
    layout: Option<String>,

    /// Account name for the TXF header
    #[arg(short, long)]
    account: Option<String>,

    /// Sort records by sale date
    #[arg(long, conflicts_with = "no_sort")]
    sort: bool,

    /// Keep statement order
    #[arg(long)]
    no_sort: bool,

    /// Generation date for the TXF header (MM/DD/YYYY, default today)
    #[arg(short, long)]
    date: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_account")]
    account: String,
    #[serde(default = "default_pdftotext")]
    pdftotext: String,
    #[serde(default = "default_layout")]
    layout: String,
    #[serde(default)]
    sort: Option<bool>,
}

fn default_account() -> String {
    "Self".to_string()
}

fn default_pdftotext() -> String {
    extract::DEFAULT_TOOL.to_string()
}

fn default_layout() -> String {
    "auto".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: default_account(),
            pdftotext: default_pdftotext(),
            layout: default_layout(),
            sort: None,
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        if let Some(config_path) = path {
            if config_path.exists() {
                match fs::read_to_string(config_path) {
                    Ok(contents) => match toml::from_str(&contents) {
                        Ok(config) => return config,
                        Err(e) => {
                            eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                        }
                    },
                    Err(e) => {
                        eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
                    }
                }
            }
        } else {
            // Try default location
            if let Some(home) = dirs::home_dir() {
                let default_config = home.join(".rusty-txf").join("config.toml");
                if default_config.exists() {
                    if let Ok(contents) = fs::read_to_string(&default_config) {
                        if let Ok(config) = toml::from_str(&contents) {
                            return config;
                        }
                    }
                }
            }
        }

        Config::default()
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-txf".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Converting from {} to {}",
            cli.input.display().to_string().dimmed(),
            cli.output.display().to_string().dimmed()
        );
    }

    if let Err(e) = run(&cli, &config) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn options(cli: &Cli, config: &Config) -> TxfResult<ConvertOptions> {
    let layout: Layout = cli.layout.as_deref().unwrap_or(config.layout.as_str()).parse()?;

    let sort = if cli.sort {
        Some(true)
    } else if cli.no_sort {
        Some(false)
    } else {
        config.sort
    };

    let mut options = ConvertOptions {
        layout,
        account: cli.account.clone().unwrap_or_else(|| config.account.clone()),
        sort,
        ..ConvertOptions::default()
    };
    if let Some(date) = &cli.date {
        options.generated = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| TxfError::Usage(format!("invalid --date '{}' (expected MM/DD/YYYY)", date)))?;
    }
    Ok(options)
}

fn run(cli: &Cli, config: &Config) -> TxfResult<()> {
    // Fail on a bad output name before doing any work
    check_output_path(&cli.output)?;
    let options = options(cli, config)?;

    let text = extract::load_lines(&cli.input, &config.pdftotext)?;
    let conversion = convert(&text, &options)?;
    write_output(&conversion.document, &cli.output)?;

    if cli.verbose {
        println!(
            "Parsed {} records using the {} layout",
            conversion.records.len(),
            conversion.layout
        );
    }
    println!(
        "{} TXF file written to {}.",
        "✓".green(),
        cli.output.display()
    );
    println!();
    print!("{}", conversion.summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["rusty-txf", "in.txt", "out.txf"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.account, "Self");
        assert_eq!(config.pdftotext, "pdftotext");
        assert_eq!(config.layout, "auto");
        assert_eq!(config.sort, None);
    }

    #[test]
    fn test_flags_override_config() {
        let config: Config = toml::from_str(
            "account = \"Joint\"\nlayout = \"checkbox\"\nsort = true\n",
        )
        .unwrap();

        let opts = options(&cli(&[]), &config).unwrap();
        assert_eq!(opts.account, "Joint");
        assert_eq!(opts.layout, Layout::Checkbox);
        assert_eq!(opts.sort, Some(true));

        let opts = options(
            &cli(&["--layout", "self-contained", "--account", "Me", "--no-sort"]),
            &config,
        )
        .unwrap();
        assert_eq!(opts.account, "Me");
        assert_eq!(opts.layout, Layout::SelfContained);
        assert_eq!(opts.sort, Some(false));
    }

    #[test]
    fn test_generation_date_flag() {
        let opts = options(&cli(&["--date", "02/14/2021"]), &Config::default()).unwrap();
        assert_eq!(opts.generated, NaiveDate::from_ymd_opt(2021, 2, 14).unwrap());
        assert!(options(&cli(&["--date", "2021-02-14"]), &Config::default()).is_err());
    }

    #[test]
    fn test_bad_layout_rejected() {
        assert!(options(&cli(&["--layout", "grid"]), &Config::default()).is_err());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/rusty-txf.toml")));
        assert_eq!(config.account, "Self");
    }

    #[test]
    fn test_usage_requires_two_paths() {
        assert!(Cli::try_parse_from(["rusty-txf", "only-input.pdf"]).is_err());
    }
}
