use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::matrix::{io_common::simplify_file_name, *};

/// Reads a backlog from an Excel workbook.
///
/// The rows follow the same positional columns as the CSV files, and the first
/// non-blank row is the header.
pub fn read_excel_backlog(
    path: &str,
    worksheet_name: Option<&str>,
) -> MatrixResult<Vec<InitiativeFields>> {
    let wrange = get_range(path, worksheet_name)?;
    let res = backlog_from_rows(wrange.rows())?;
    info!(
        "read_excel_backlog: {}: {} initiatives",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

/// Maps worksheet rows to records, with the same rules as text files: blank
/// rows are skipped, the first remaining row is the header, and at least one
/// data row is required.
fn backlog_from_rows<'a>(
    rows: impl Iterator<Item = &'a [DataType]>,
) -> MatrixResult<Vec<InitiativeFields>> {
    let mut header_seen = false;
    let mut res: Vec<InitiativeFields> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let mut values: Vec<String> = Vec::new();
        for cell in row {
            values.push(read_cell(cell, idx)?);
        }
        if values.iter().all(|s| s.is_empty()) {
            continue;
        }
        if !header_seen {
            debug!("read_excel_backlog: header: {:?}", values);
            header_seen = true;
            continue;
        }
        debug!("read_excel_backlog: idx: {:?} row: {:?}", idx, &values);
        res.push(InitiativeFields::from_columns(&values));
    }
    if res.is_empty() {
        return Err(MatrixErrors::EmptyBacklog).context(MatrixSnafu {});
    }
    Ok(res)
}

fn read_cell(cell: &DataType, idx: usize) -> MatrixResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno: (idx + 1) as u64,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> MatrixResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_backlog: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(name) = worksheet_name {
        workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?
    };
    Ok(wrange)
}
