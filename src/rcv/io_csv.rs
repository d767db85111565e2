// Primitives for reading CSV files.

use std::fs::File;

use crate::rcv::{io_common::make_default_id, *};

pub fn read_csv_ranking(path: String, cfs: &FileSource) -> BRcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(&path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_ranking: lineno: {:?} line: {:?}", lineno, line);
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(RowTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let content = line
                .get(count_idx)
                .context(RowTooShortSnafu { lineno })?
                .trim();
            let c = content.parse::<u64>().ok().context(WrongCountSnafu {
                lineno,
                content: content.to_string(),
            })?;
            Some(c)
        } else {
            None
        };

        let choices: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .map(|s| s.to_string())
            .collect();

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}

// The iterator starts at the first ballot. Rows are counted from 1.
fn get_records(
    path: &String,
    cfs: &FileSource,
) -> RcvResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index(1)?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(js: JSValue) -> FileSource {
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn with_header_id_and_count() {
        let path = test_dir()
            .join("condorcet_example")
            .join("ballots.csv")
            .display()
            .to_string();
        let cfs = source(json!({
            "provider": "csv",
            "filePath": "ballots.csv",
            "firstVoteColumnIndex": 3,
            "firstVoteRowIndex": 2,
            "idColumnIndex": 1,
            "countColumnIndex": 2
        }));
        let ballots = read_csv_ranking(path, &cfs).unwrap();
        assert_eq!(ballots.len(), 4);
        assert_eq!(
            ballots[0],
            ParsedBallot {
                id: Some("b1".to_string()),
                count: Some(23),
                choices: vec!["A".to_string(), "C".to_string(), "B".to_string()],
            }
        );
        assert_eq!(ballots[3].count, Some(2));
    }

    #[test]
    fn plain_rows() {
        let path = test_dir()
            .join("condorcet_paradox")
            .join("ballots.csv")
            .display()
            .to_string();
        let cfs = source(json!({"provider": "csv", "filePath": "ballots.csv"}));
        let ballots = read_csv_ranking(path, &cfs).unwrap();
        assert_eq!(ballots.len(), 60);
        assert_eq!(ballots[0].count, None);
        assert_eq!(ballots[0].id, Some("ballots.csv-00000001".to_string()));
        assert_eq!(ballots[0].choices.len(), 3);
    }

    #[test]
    fn bad_count() {
        let path = test_dir()
            .join("condorcet_example")
            .join("ballots.csv")
            .display()
            .to_string();
        // The header row is read as a ballot.
        let cfs = source(json!({
            "provider": "csv",
            "filePath": "ballots.csv",
            "firstVoteColumnIndex": 3,
            "countColumnIndex": 2
        }));
        let res = read_csv_ranking(path, &cfs);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(RcvError::WrongCount { lineno: 1, .. })
        ));
    }
}
