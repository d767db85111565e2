use log::{debug, info, warn};

use condorcet::builder::Builder;
use condorcet::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} is empty or misses the requested worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Excel file {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Row {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number or a column letter"))]
    ParsingJsonNumber {},
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Error opening CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Row {lineno} is too short"))]
    RowTooShort { lineno: usize },
    #[snafu(display("Row {lineno}: cannot read the ballot count {content:?}"))]
    WrongCount { lineno: usize, content: String },

    #[snafu(display("Provider {provider:?} is not supported (expected csv or xlsx)"))]
    UnknownProvider { provider: String },
    #[snafu(display("No ballot file was provided"))]
    MissingFileSource {},
    #[snafu(display("Voting error"))]
    Voting { source: VotingErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

/// The errors returned from the readers are boxed to keep the results small.
pub type BRcvResult<T> = Result<T, Box<RcvError>>;

/// A ballot, as parsed by the readers.
/// The names are not checked against the candidates yet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

fn result_stats_to_json(rs: &VotingResult) -> JSValue {
    let pairwise: Vec<JSValue> = rs
        .contests
        .iter()
        .map(|c| {
            json!({
                "candidate": c.candidate,
                "opponent": c.opponent,
                "wins": c.wins.to_string(),
                "losses": c.losses.to_string(),
            })
        })
        .collect();
    json!({
        "winner": rs.winner,
        "numVoters": rs.num_voters.to_string(),
        "rejected": rs.rejected.to_string(),
        "pairwise": pairwise,
    })
}

fn build_summary_js(config: &RcvConfig, rv: &VotingResult) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(rv) })
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> BRcvResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(p2, cfs),
        "xlsx" => io_excel::read_excel_ranking(p2, cfs),
        x => Err(Box::new(RcvError::UnknownProvider {
            provider: x.to_string(),
        })),
    }
}

/// Turns the parsed ballots into votes.
///
/// Nothing is dropped here, the ballots that cannot be counted are reported
/// and left to the tally, which counts them as rejected.
fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
    candidates: &[Candidate],
) -> RcvResult<Vec<Vote>> {
    let checker = Builder::with_candidates(candidates).context(VotingSnafu {})?;
    let mut res: Vec<Vote> = Vec::new();
    for pb in parsed_ballots.iter() {
        // Default of 1 if not specified
        let count = pb.count.unwrap_or(1);
        if count == 0 {
            debug!("validate_ballots: skipping ballot {:?} with count 0", pb.id);
            continue;
        }
        let names = io_common::trim_choices(&pb.choices);
        if let Err(e) = checker.check_vote(&names) {
            warn!(
                "validate_ballots: ballot {:?} will not be counted: {}",
                pb.id.as_deref().unwrap_or("<no id>"),
                e
            );
        }
        res.push(Vote {
            candidates: names,
            count,
        });
    }
    Ok(res)
}

fn candidates_from_config(config: &RcvConfig) -> Vec<Candidate> {
    config
        .candidates
        .iter()
        .map(|c| Candidate {
            name: c.name.clone(),
            code: match c.code.clone() {
                Some(x) if x.is_empty() => None,
                x => x,
            },
        })
        .collect()
}

/// Where the summary goes: the command line wins over the configuration.
/// `None` means the standard output.
fn summary_destination(
    config: &RcvConfig,
    root_path: &Path,
    out: &Option<String>,
) -> Option<PathBuf> {
    match out.as_deref() {
        Some("stdout") | Some("") => None,
        Some(p) => Some(PathBuf::from(p)),
        None => config
            .output_settings
            .output_directory
            .as_ref()
            .map(|dir| root_path.join(dir).join("summary.json")),
    }
}

fn write_summary(dest: &Option<PathBuf>, pretty_js: &str) -> RcvResult<()> {
    match dest {
        None => {
            println!("{}", pretty_js);
        }
        Some(p) => {
            let path = p.display().to_string();
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context(WritingSummarySnafu { path: path.clone() })?;
            }
            info!("Writing summary to {:?}", path);
            fs::write(p, pretty_js).context(WritingSummarySnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(summary_path: String, pretty_js_stats: &str) -> RcvResult<()> {
    let summary_ref = read_summary(summary_path.clone())?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu { path: summary_path }.fail();
    }
    Ok(())
}

/// Tabulates the election and returns its summary.
pub fn tabulate(config: &RcvConfig, root_path: &Path) -> BRcvResult<JSValue> {
    if config.cvr_file_sources.is_empty() {
        return Err(Box::new(RcvError::MissingFileSource {}));
    }

    let candidates = candidates_from_config(config);
    let mut data: Vec<Vote> = Vec::new();
    for cfs in config.cvr_file_sources.iter() {
        let parsed = read_ranking_data(root_path, cfs)?;
        let mut file_data = validate_ballots(&parsed, &candidates)?;
        data.append(&mut file_data);
    }
    debug!("data: {:?}", data);

    let result = run_voting_stats(&data, &candidates).context(VotingSnafu {})?;
    info!("res {:?}", result);

    Ok(build_summary_js(config, &result))
}

pub fn run_election(
    config: &RcvConfig,
    root_path: &Path,
    out: &Option<String>,
    check_summary_path: Option<String>,
) -> BRcvResult<()> {
    let result_js = tabulate(config, root_path)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let dest = summary_destination(config, root_path, out);
    write_summary(&dest, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        check_reference(summary_p, &pretty_js_stats)?;
    }
    Ok(())
}

/// Builds the configuration when the election is described on the command line only.
fn config_from_args(args: &Args) -> RcvResult<RcvConfig> {
    let names = match &args.candidates {
        Some(names) if !names.is_empty() => names.clone(),
        _ => whatever!("No configuration file: the candidates must be passed with --candidates"),
    };
    let input = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("No configuration file: the ballots must be passed with --input"),
    };
    let input_name = io_common::simplify_file_name(&input);
    Ok(RcvConfig {
        output_settings: OutputSettings::with_contest_name(input_name),
        cvr_file_sources: vec![FileSource::from_args(input, args)],
        candidates: names
            .iter()
            .map(|name| RcvCandidate {
                name: name.clone(),
                code: None,
            })
            .collect(),
    })
}

pub fn run_election_args(args: &Args) -> BRcvResult<()> {
    let (config, root_path) = match &args.config {
        Some(config_path) => {
            let mut config = read_config(config_path.clone())?;
            info!("config: {:?}", config);
            if let Some(input) = &args.input {
                // Paths from the command line are not relative to the configuration.
                let abs_input = std::env::current_dir()
                    .map(|d| d.join(input).display().to_string())
                    .unwrap_or_else(|_| input.clone());
                config.cvr_file_sources = vec![FileSource::from_args(abs_input, args)];
            }
            let root_path = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root_path)
        }
        None => (config_from_args(args)?, PathBuf::from(".")),
    };
    run_election(&config, &root_path, &args.out, args.reference.clone())
}

#[cfg(test)]
fn test_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> BRcvResult<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = test_dir().join(test_name);
    let config_p = dir.join(format!("{}_config.json", test_name));
    let summary_p = dir.join(format!("{}_expected_summary.json", test_name));
    info!("Running test {}", test_name);
    let config = read_config(config_p.display().to_string())?;
    run_election(
        &config,
        &dir,
        &Some("stdout".to_string()),
        Some(summary_p.display().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condorcet_example() {
        test_wrapper("condorcet_example").unwrap();
    }

    #[test]
    fn four_candidates() {
        test_wrapper("four_candidates").unwrap();
    }

    #[test]
    fn condorcet_paradox() {
        test_wrapper("condorcet_paradox").unwrap();
    }

    #[test]
    fn rejected_ballots() {
        test_wrapper("rejected_ballots").unwrap();
    }

    #[test]
    fn winner_from_summary() {
        let dir = test_dir().join("four_candidates");
        let config =
            read_config(dir.join("four_candidates_config.json").display().to_string()).unwrap();
        let js = tabulate(&config, &dir).unwrap();
        assert_eq!(js["results"]["winner"], json!("Nashville"));
        assert_eq!(js["results"]["numVoters"], json!("100"));
        assert_eq!(js["config"]["contest"], json!("Capital of Tennessee"));
        // 4 candidates, 3 opponents each
        assert_eq!(js["results"]["pairwise"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn summary_written_to_file() {
        let dir = test_dir().join("condorcet_example");
        let config = read_config(
            dir.join("condorcet_example_config.json")
                .display()
                .to_string(),
        )
        .unwrap();
        let out = std::env::temp_dir()
            .join("ctally_tests")
            .join("condorcet_example_summary.json");
        run_election(&config, &dir, &Some(out.display().to_string()), None).unwrap();
        let written = read_summary(out.display().to_string()).unwrap();
        let expected = read_summary(
            dir.join("condorcet_example_expected_summary.json")
                .display()
                .to_string(),
        )
        .unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn reference_mismatch() {
        let dir = test_dir().join("condorcet_paradox");
        let config = read_config(
            dir.join("condorcet_paradox_config.json")
                .display()
                .to_string(),
        )
        .unwrap();
        // The summary of another election.
        let other = test_dir()
            .join("condorcet_example")
            .join("condorcet_example_expected_summary.json");
        let res = run_election(
            &config,
            &dir,
            &Some("stdout".to_string()),
            Some(other.display().to_string()),
        );
        assert!(matches!(
            res.map_err(|e| *e),
            Err(RcvError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn ballots_with_candidate_codes() {
        let dir = test_dir().join("condorcet_example");
        let mut config = read_config(
            dir.join("condorcet_example_config.json")
                .display()
                .to_string(),
        )
        .unwrap();
        // The ballot file uses the codes A, B and C.
        config.candidates = ["Alice", "Bob", "Charlie"]
            .iter()
            .map(|name| RcvCandidate {
                name: name.to_string(),
                code: Some(name[..1].to_string()),
            })
            .collect();
        let js = tabulate(&config, &dir).unwrap();
        assert_eq!(js["results"]["winner"], json!("Charlie"));
        assert_eq!(js["results"]["numVoters"], json!("60"));
        assert_eq!(js["results"]["rejected"], json!("0"));
        assert_eq!(js["results"]["pairwise"][0]["candidate"], json!("Alice"));
    }

    #[test]
    fn unknown_provider() {
        let mut config = read_config(
            test_dir()
                .join("condorcet_example")
                .join("condorcet_example_config.json")
                .display()
                .to_string(),
        )
        .unwrap();
        config.cvr_file_sources[0].provider = "dominion".to_string();
        let res = tabulate(&config, &test_dir().join("condorcet_example"));
        assert!(matches!(
            res.map_err(|e| *e),
            Err(RcvError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn command_line_only() {
        let input = test_dir()
            .join("condorcet_paradox")
            .join("ballots.csv")
            .display()
            .to_string();
        let args = Args {
            config: None,
            reference: None,
            out: Some("stdout".to_string()),
            input: Some(input),
            input_type: Some("csv".to_string()),
            candidates: Some(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
            excel_worksheet_name: None,
            verbose: false,
        };
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.output_settings.contest_name, "ballots.csv");
        let js = tabulate(&config, Path::new(".")).unwrap();
        assert_eq!(js["results"]["winner"], JSValue::Null);
        assert_eq!(js["results"]["numVoters"], json!("60"));
    }

    #[test]
    fn command_line_needs_candidates() {
        let args = Args {
            config: None,
            reference: None,
            out: None,
            input: Some("ballots.csv".to_string()),
            input_type: None,
            candidates: None,
            excel_worksheet_name: None,
            verbose: false,
        };
        assert!(matches!(
            config_from_args(&args),
            Err(RcvError::Whatever { .. })
        ));
    }

    #[test]
    fn summary_destination_rules() {
        let mut config = RcvConfig {
            output_settings: OutputSettings::with_contest_name("x".to_string()),
            cvr_file_sources: vec![],
            candidates: vec![],
        };
        let root = Path::new("/elections");
        assert_eq!(summary_destination(&config, root, &None), None);
        config.output_settings.output_directory = Some("out".to_string());
        assert_eq!(
            summary_destination(&config, root, &None),
            Some(PathBuf::from("/elections/out/summary.json"))
        );
        assert_eq!(
            summary_destination(&config, root, &Some("stdout".to_string())),
            None
        );
        assert_eq!(
            summary_destination(&config, root, &Some("res.json".to_string())),
            Some(PathBuf::from("res.json"))
        );
    }
}
