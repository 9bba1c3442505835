// Primitives for reading and writing CSV files.

use crate::matrix::{io_common::simplify_file_name, *};

pub fn read_csv_backlog(path: &str) -> MatrixResult<Vec<InitiativeFields>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let records = parse_backlog(&contents).context(MatrixSnafu {})?;
    info!(
        "read_csv_backlog: {}: {} initiatives",
        simplify_file_name(path),
        records.len()
    );
    Ok(records)
}

const MATRIX_HEADER: [&str; 9] = [
    "id",
    "team",
    "priority",
    "name",
    "votes",
    "avgImpact",
    "avgComplexity",
    "quadrant",
    "keyResult",
];

/// Writes the plotted initiatives, one per line.
pub fn write_matrix_csv(path: &str, plotted: &[&PlottedInitiative]) -> MatrixResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    wtr.write_record(MATRIX_HEADER)
        .context(WritingCsvSnafu { path })?;
    for p in plotted {
        let i = &p.initiative;
        wtr.write_record(&[
            i.id.clone(),
            i.team.clone(),
            i.priority.label().to_string(),
            i.name.clone(),
            i.votes().len().to_string(),
            p.coordinates.avg_impact.to_string(),
            p.coordinates.avg_complexity.to_string(),
            p.quadrant().label().to_string(),
            i.key_result.clone(),
        ])
        .context(WritingCsvSnafu { path })?;
    }
    wtr.flush().context(WritingFileSnafu { path })?;
    debug!("write_matrix_csv: wrote {} rows to {:?}", plotted.len(), path);
    Ok(())
}
