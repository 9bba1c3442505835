// Primitives for reading backlogs from delimited text.

use log::{debug, info};

use crate::config::*;

const DEFAULT_TEAM: &str = "General";
const DEFAULT_TEXT: &str = "N/A";
const DEFAULT_NAME: &str = "Untitled initiative";

/// Parses the content of a backlog file.
///
/// The first non-blank line is a header. It is only used to pick the
/// delimiter: `;` if the header contains one, `,` otherwise. Every following
/// non-blank line produces one initiative, in order.
///
/// Returns `MatrixErrors::EmptyBacklog` when there is not at least one header
/// line and one data line. Nothing is returned in that case.
pub fn parse_backlog(text: &str) -> Result<Vec<InitiativeFields>, MatrixErrors> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.trim().is_empty())
        .collect();

    let (header, rows) = match lines.split_first() {
        Some((header, rows)) if !rows.is_empty() => (header, rows),
        _ => return Err(MatrixErrors::EmptyBacklog),
    };

    let delimiter = detect_delimiter(header);
    debug!("parse_backlog: header: {:?} delimiter: {:?}", header, delimiter);

    let res: Vec<InitiativeFields> = rows
        .iter()
        .map(|line| InitiativeFields::from_columns(&split_fields(line, delimiter)))
        .collect();
    info!("parse_backlog: read {} initiatives", res.len());
    Ok(res)
}

/// The delimiter used by a file, guessed from its header line.
pub fn detect_delimiter(header: &str) -> char {
    if header.contains(';') {
        ';'
    } else {
        ','
    }
}

/// Splits one line into trimmed fields.
///
/// A double quote opens or closes a quoted section, in which the delimiter is
/// plain text. Inside a quoted section, two double quotes produce one literal
/// double quote.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if inside_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                inside_quotes = !inside_quotes;
            }
        } else if c == delimiter && !inside_quotes {
            values.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    values.push(current.trim().to_string());
    values
}

impl InitiativeFields {
    /// Maps positional columns to the fields of an initiative.
    ///
    /// Columns are, in order: team, metric, objective, key result, priority,
    /// name. Missing or empty columns take a default value.
    pub fn from_columns(values: &[String]) -> InitiativeFields {
        let col = |idx: usize| -> Option<&str> {
            values
                .get(idx)
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty())
        };
        let name = col(5);
        InitiativeFields {
            team: col(0).unwrap_or(DEFAULT_TEAM).to_string(),
            metric: col(1).unwrap_or(DEFAULT_TEXT).to_string(),
            objective: col(2).unwrap_or(DEFAULT_TEXT).to_string(),
            key_result: col(3).unwrap_or(DEFAULT_TEXT).to_string(),
            priority: col(4).map(Priority::normalize).unwrap_or(Priority::Low),
            name: name.unwrap_or(DEFAULT_NAME).to_string(),
            description: name.map(|s| s.to_string()),
        }
    }
}
