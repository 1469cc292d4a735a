// recmatch - match incoming records against a master data set

mod commands;
mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use recmatch_io::IoError;
use recmatch_link::LinkError;

use exit_codes::{EXIT_IO, EXIT_MATCH, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "recmatch")]
#[command(about = "Match incoming records against a master data set")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a master data set into an index for repeated matching
    #[command(after_help = "\
Examples:
  recmatch process -p profile.toml -m donors.csv --primary-key ID -o donors.idx.json
  recmatch process -p profile.csv -m donors.tsv --primary-key 'Donor ID' > donors.idx.json")]
    Process {
        /// Profile: a .toml file, or a sheet with key/master-key/points/strip/compare columns
        #[arg(long, short = 'p')]
        profile: PathBuf,

        /// Master data set
        #[arg(long, short = 'm')]
        master: PathBuf,

        /// Master column holding unique identifiers
        #[arg(long)]
        primary_key: String,

        /// Format of inputs whose type cannot be inferred from the file name
        #[arg(long, short = 'i', default_value = "csv")]
        input_format: String,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score incoming records against a master data set
    #[command(after_help = "\
Examples:
  recmatch match -n new.csv -p profile.toml -m donors.csv --primary-key ID
  recmatch match -n new.csv -M donors.idx.json -c 2 -o matches.csv
  recmatch match -n new.tsv -M donors.idx.json -j 8 -f tsv > matches.tsv")]
    Match {
        /// Incoming data set
        #[arg(long, short = 'n')]
        incoming: PathBuf,

        /// Profile (required with --master)
        #[arg(long, short = 'p')]
        profile: Option<PathBuf>,

        /// Master data set
        #[arg(long, short = 'm', conflicts_with = "processed_master")]
        master: Option<PathBuf>,

        /// Processed master written by `recmatch process`; its stored profile is used
        #[arg(long = "processed-master", short = 'M')]
        processed_master: Option<PathBuf>,

        /// Master column holding unique identifiers (required with --master)
        #[arg(long)]
        primary_key: Option<String>,

        /// Minimum score for a match to be reported
        #[arg(long, short = 'c', default_value_t = 0.0, allow_negative_numbers = true)]
        match_cutoff: f64,

        /// Worker threads for scoring incoming records
        #[arg(long, short = 'j', default_value_t = 1)]
        jobs: usize,

        /// Format of inputs whose type cannot be inferred from the file name
        #[arg(long, short = 'i', default_value = "csv")]
        input_format: String,

        /// Output format (default: from --output extension, else csv)
        #[arg(long, short = 'f')]
        output_format: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            profile,
            master,
            primary_key,
            input_format,
            output,
        } => commands::cmd_process(profile, master, primary_key, input_format, output),
        Commands::Match {
            incoming,
            profile,
            master,
            processed_master,
            primary_key,
            match_cutoff,
            jobs,
            input_format,
            output_format,
            output,
        } => commands::cmd_match(commands::MatchOptions {
            incoming,
            profile,
            master,
            processed_master,
            primary_key,
            cutoff: match_cutoff,
            jobs,
            input_format,
            output_format,
            output,
        }),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn matching(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MATCH, message: msg.into(), hint: None }
    }

    /// Create error from a failed read or write of `path`.
    pub fn file(path: &Path, err: IoError) -> Self {
        let code = match &err {
            IoError::Io(_) => EXIT_IO,
            IoError::Csv(e) if e.is_io_error() => EXIT_IO,
            IoError::UnsupportedFormat(_) => EXIT_USAGE,
            IoError::Csv(_) | IoError::Json(_) | IoError::IndexVersion { .. } | IoError::Table(_) => {
                EXIT_PARSE
            }
        };
        let hint = match &err {
            IoError::UnsupportedFormat(_) => Some("use --input-format csv or tsv".to_string()),
            _ => None,
        };
        Self { code, message: format!("{}: {err}", path.display()), hint }
    }

    /// Create error from a profile or matching failure.
    pub fn link(err: LinkError) -> Self {
        let code = match &err {
            LinkError::ConfigParse(_)
            | LinkError::ConfigValidation(_)
            | LinkError::InvalidCompareKind(_)
            | LinkError::InvalidValue { .. }
            | LinkError::CorruptIndex(_) => EXIT_PARSE,
            LinkError::MissingField { .. }
            | LinkError::UnprocessedIndex
            | LinkError::ProfileMismatch(_)
            | LinkError::Table(_) => EXIT_MATCH,
        };
        Self { code, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
