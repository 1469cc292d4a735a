//! `recmatch process` and `recmatch match`.

use std::io;
use std::path::{Path, PathBuf};

use recmatch_io::{
    delimiter_for, export_path, export_source, get_format, import_source, load_index,
    read_file_as_utf8, save_index, write_index,
};
use recmatch_link::{Mapping, MatchResult, Master, ProcessedSource, Profile, ProfileConfig};
use recmatch_table::{Record, Source};

use crate::CliError;

/// Columns of the match report.
const RESULT_HEADERS: [&str; 3] = ["Input Line", "Unique ID", "Match Score"];

pub struct MatchOptions {
    pub incoming: PathBuf,
    pub profile: Option<PathBuf>,
    pub master: Option<PathBuf>,
    pub processed_master: Option<PathBuf>,
    pub primary_key: Option<String>,
    pub cutoff: f64,
    pub jobs: usize,
    pub input_format: String,
    pub output_format: Option<String>,
    pub output: Option<PathBuf>,
}

pub fn cmd_process(
    profile_path: PathBuf,
    master_path: PathBuf,
    primary_key: String,
    input_format: String,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let profile = load_profile(&profile_path, &input_format)?;
    let mut master = load_source(&master_path, &input_format)?;
    set_primary_key(&mut master, &master_path, &primary_key)?;
    check_columns(&profile, &master, "master", |m| m.master_key.as_str())?;

    let index = ProcessedSource::build(master, true, Some(profile));

    match &output {
        Some(path) => {
            save_index(&index, path).map_err(|e| CliError::file(path, e))?;
            eprintln!("processed {} master records into {}", index.source().len(), path.display());
        }
        None => {
            write_index(&index, io::stdout().lock())
                .map_err(|e| CliError::io(format!("cannot write index: {e}")))?;
            eprintln!("processed {} master records", index.source().len());
        }
    }
    Ok(())
}

pub fn cmd_match(opts: MatchOptions) -> Result<(), CliError> {
    if opts.jobs == 0 {
        return Err(CliError::args("--jobs must be at least 1"));
    }
    if opts.master.is_none() && opts.processed_master.is_none() {
        return Err(CliError::args("no master data set given")
            .with_hint("pass --master with --profile and --primary-key, or --processed-master"));
    }

    // Resolve the output delimiter before any expensive work.
    let output_format = match (&opts.output_format, &opts.output) {
        (Some(format), _) => format.to_ascii_lowercase(),
        (None, Some(path)) => get_format(path, "csv"),
        (None, None) => "csv".to_string(),
    };
    let delimiter = delimiter_for(&output_format).map_err(|e| {
        CliError::args(e.to_string()).with_hint("use --output-format csv or tsv")
    })?;

    let incoming = load_source(&opts.incoming, &opts.input_format)?;

    let report = match &opts.processed_master {
        Some(index_path) => {
            let index = load_index(index_path).map_err(|e| CliError::file(index_path, e))?;
            let profile = match (index.profile(), &opts.profile) {
                (Some(stored), _) => stored.clone(),
                (None, Some(path)) => load_profile(path, &opts.input_format)?,
                (None, None) => {
                    return Err(CliError::args("processed master has no stored profile")
                        .with_hint("pass --profile"));
                }
            };
            if opts.primary_key.is_some() {
                eprintln!("warning: --primary-key ignored; the processed master keeps its own key");
            }
            check_columns(&profile, &incoming, "incoming", |m| m.key.as_str())?;
            run_match(&profile, &index, &incoming, &opts)?
        }
        None => {
            let (Some(profile_path), Some(master_path), Some(primary_key)) =
                (&opts.profile, &opts.master, &opts.primary_key)
            else {
                return Err(CliError::args("--master needs --profile and --primary-key")
                    .with_hint("recmatch match -n new.csv -p profile.toml -m master.csv --primary-key ID"));
            };
            let profile = load_profile(profile_path, &opts.input_format)?;
            let mut master = load_source(master_path, &opts.input_format)?;
            set_primary_key(&mut master, master_path, primary_key)?;
            check_columns(&profile, &master, "master", |m| m.master_key.as_str())?;
            check_columns(&profile, &incoming, "incoming", |m| m.key.as_str())?;
            run_match(&profile, &master, &incoming, &opts)?
        }
    };

    match &opts.output {
        Some(path) => {
            export_path(&report, path, delimiter).map_err(|e| CliError::file(path, e))?;
            eprintln!("wrote {}", path.display());
        }
        None => export_source(&report, io::stdout().lock(), delimiter)
            .map_err(|e| CliError::io(format!("cannot write results: {e}")))?,
    }
    Ok(())
}

/// Score `incoming` against `master` and turn the results into a report.
fn run_match<'a>(
    profile: &Profile,
    master: impl Into<Master<'a>>,
    incoming: &'a Source,
    opts: &MatchOptions,
) -> Result<Source, CliError> {
    let master = master.into();
    let master_len = match master {
        Master::Source(source) => source.len(),
        Master::Index(index) => index.source().len(),
    };

    let results = profile
        .compare_sources_parallel(master, incoming, opts.cutoff, opts.jobs)
        .map_err(CliError::link)?;

    eprintln!(
        "matched {} incoming records against {} master records: {} results (cutoff {})",
        incoming.len(),
        master_len,
        results.len(),
        opts.cutoff
    );
    results_source(&results)
}

fn results_source(results: &[MatchResult<'_>]) -> Result<Source, CliError> {
    let mut report = Source::from_headers(RESULT_HEADERS);
    for result in results {
        let input_line = result.incoming.input_line.map(|n| n.to_string()).unwrap_or_default();
        let unique_id = result.master.record_id().unwrap_or("");
        let score = result.score.to_string();
        let record = Record::from_pairs([
            (RESULT_HEADERS[0], input_line.as_str()),
            (RESULT_HEADERS[1], unique_id),
            (RESULT_HEADERS[2], score.as_str()),
        ]);
        report
            .add_record(record, None)
            .map_err(|e| CliError::matching(e.to_string()))?;
    }
    Ok(report)
}

/// Load a profile from TOML, or from a delimited sheet of mapping rows.
fn load_profile(path: &Path, input_format: &str) -> Result<Profile, CliError> {
    let profile = if get_format(path, input_format) == "toml" {
        let text = read_file_as_utf8(path).map_err(|e| CliError::file(path, e))?;
        ProfileConfig::from_toml(&text)
            .map_err(|e| CliError::link(e).with_hint(format!("check {}", path.display())))?
            .into_profile()
    } else {
        let sheet = load_source(path, input_format)?;
        Profile::from_source(&sheet)
            .map_err(|e| CliError::link(e).with_hint(format!("check {}", path.display())))?
    };

    if profile.mappings().is_empty() {
        return Err(CliError::parse(format!("profile {} has no mappings", path.display())));
    }
    Ok(profile)
}

fn load_source(path: &Path, input_format: &str) -> Result<Source, CliError> {
    import_source(path, input_format).map_err(|e| CliError::file(path, e))
}

fn set_primary_key(source: &mut Source, path: &Path, column: &str) -> Result<(), CliError> {
    source.set_primary_key(Some(column)).map_err(|e| {
        CliError::parse(format!("{}: {e}", path.display()))
            .with_hint(format!("available columns: {}", source.headers().join(", ")))
    })
}

/// Every column the profile reads on this side must exist in `source`.
fn check_columns(
    profile: &Profile,
    source: &Source,
    role: &str,
    column: impl Fn(&Mapping) -> &str,
) -> Result<(), CliError> {
    for mapping in profile.mappings() {
        let name = column(mapping);
        if !source.has_column(name) {
            return Err(CliError::matching(format!(
                "profile column '{name}' not found in {role} data"
            ))
            .with_hint(format!("available columns: {}", source.headers().join(", "))));
        }
    }
    Ok(())
}
