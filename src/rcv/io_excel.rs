// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::rcv::{io_common::make_default_id, *};

pub fn read_excel_ranking(path: String, cfs: &FileSource) -> BRcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);

    let wrange = get_range(&path, cfs)?;

    let id_idx_o = cfs.id_column_index_int()?;
    let start_range = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;
    // The first row holds the header by default.
    let first_row = cfs.first_vote_row_index(2)?;
    debug!(
        "read_excel_ranking: start_range: {:?} first_row: {:?}",
        start_range, first_row
    );

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row - 1) {
        let lineno = idx + 1;
        debug!("read_excel_ranking: lineno: {:?} row: {:?}", lineno, row);

        let id = match id_idx_o {
            Some(id_idx) => {
                let cell = row.get(id_idx).context(RowTooShortSnafu { lineno })?;
                read_cell(cell, lineno)?
            }
            None => default_id(lineno),
        };

        let count = match count_idx_o {
            Some(count_idx) => {
                let cell = row.get(count_idx).context(RowTooShortSnafu { lineno })?;
                Some(read_count(cell, lineno)?)
            }
            None => None,
        };

        let mut choices: Vec<String> = Vec::new();
        for cell in row.iter().skip(start_range) {
            choices.push(read_cell(cell, lineno)?);
        }

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize) -> RcvResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        // Candidates named with a number
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok((*f as i64).to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn read_count(cell: &DataType, lineno: usize) -> RcvResult<u64> {
    match cell {
        DataType::Int(i) if *i >= 0 => Ok(*i as u64),
        DataType::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Ok(*f as u64),
        DataType::String(s) => s.trim().parse::<u64>().ok().context(WrongCountSnafu {
            lineno,
            content: s.clone(),
        }),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &String, cfs: &FileSource) -> BRcvResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu { path: path.clone() })?
            .context(OpeningExcelSnafu { path: path.clone() })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(RcvError::EmptyExcel { path: path.clone() })),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => Err(Box::new(RcvError::AmbiguousWorksheet { path: path.clone() })),
        }
    }
}
