//! CRM export parsing: `;`-separated CSV with a header row.

use std::collections::HashMap;

use tracing::warn;

use crate::error::DataError;
use crate::pipeline::types::Deal;

/// Columns every CRM export must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "deal_id",
    "deal_name",
    "amount_eur",
    "stage",
    "last_activity",
];

const SEPARATOR: char = ';';

/// Parse a CRM export into deals, in file order.
pub fn parse_crm(content: &str) -> Result<Vec<Deal>, DataError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(DataError::EmptyCrm)?;
    let columns: HashMap<String, usize> = split_fields(header, header_line)?
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }

    let width = columns.len();
    let mut deals = Vec::new();
    for (line_no, line) in lines {
        let fields = split_fields(line, line_no)?;
        if fields.len() > width {
            return Err(DataError::Malformed {
                line: line_no,
                reason: format!("expected {width} fields, saw {}", fields.len()),
            });
        }

        let field = |name: &str| -> String {
            columns
                .get(name)
                .and_then(|idx| fields.get(*idx))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let deal_id = field("deal_id");
        let amount_eur = parse_amount(&deal_id, &field("amount_eur"))?;
        deals.push(Deal {
            deal_name: field("deal_name"),
            stage: field("stage"),
            last_activity: field("last_activity"),
            amount_eur,
            deal_id,
        });
    }

    Ok(deals)
}

/// Parse an amount like `12 500`. Empty is 0, negatives clamp to 0.
fn parse_amount(deal_id: &str, raw: &str) -> Result<u64, DataError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Ok(0);
    }

    let value = match cleaned.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match cleaned.parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            _ => {
                return Err(DataError::InvalidAmount {
                    deal_id: deal_id.to_string(),
                    value: raw.to_string(),
                });
            }
        },
    };

    if value < 0 {
        warn!(deal_id = %deal_id, amount = value, "Negative amount_eur clamped to 0");
    }
    Ok(u64::try_from(value).unwrap_or(0))
}

/// Split one line on `;`, honouring double quotes (`""` is a literal quote).
fn split_fields(line: &str, line_no: usize) -> Result<Vec<String>, DataError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            SEPARATOR if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }

    if in_quotes {
        return Err(DataError::Malformed {
            line: line_no,
            reason: "unterminated quoted field".to_string(),
        });
    }
    fields.push(current);
    Ok(fields)
}
