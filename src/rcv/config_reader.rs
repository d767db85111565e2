use crate::rcv::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

impl OutputSettings {
    pub fn with_contest_name(contest_name: String) -> OutputSettings {
        OutputSettings {
            contest_name,
            output_directory: None,
            contest_date: None,
            contest_jurisdiction: None,
            contest_office: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source described on the command line: choices start in the first
    /// column, there is no id and no count.
    pub fn from_args(file_path: String, args: &Args) -> FileSource {
        FileSource {
            provider: args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
            file_path,
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
            count_column_index: None,
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        }
    }

    /// The first column with a choice, starting at 0.
    pub fn first_vote_column_index(&self) -> RcvResult<usize> {
        match &self._first_vote_column_index {
            None => Ok(0),
            Some(js) => Ok(read_js_int(js)? - 1),
        }
    }

    /// The first row with a ballot, starting at 1 as in spreadsheets.
    pub fn first_vote_row_index(&self, default: usize) -> RcvResult<usize> {
        match &self._first_vote_row_index {
            None => Ok(default),
            Some(js) => read_js_int(js),
        }
    }

    /// The column with the ballot id, starting at 0.
    pub fn id_column_index_int(&self) -> RcvResult<Option<usize>> {
        optional_column(&self.id_column_index)
    }

    /// The column with the ballot count, starting at 0.
    pub fn count_column_index_int(&self) -> RcvResult<Option<usize>> {
        optional_column(&self.count_column_index)
    }
}

fn optional_column(x: &Option<JSValue>) -> RcvResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(js) => Ok(Some(read_js_int(js)? - 1)),
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvCandidate {
    pub name: String,
    pub code: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources")]
    pub cvr_file_sources: Vec<FileSource>,
    pub candidates: Vec<RcvCandidate>,
}

pub fn read_config(path: String) -> RcvResult<RcvConfig> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: String) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Reads a 1-based index: a number, a string with a number, or an Excel
/// column name (`A` is 1, `AA` is 27).
fn read_js_int(x: &JSValue) -> RcvResult<usize> {
    let res = match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add((c as usize) - ('a' as usize) + 1)
            })
        }
        JSValue::String(s) => s.parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|x| *x >= 1).context(ParsingJsonNumberSnafu {})
}
