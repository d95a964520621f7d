//! Batch screening of an identifier column.

use serde::Serialize;

use crate::cas::{Validity, validate};
use crate::models::{KeyNormalization, Result, Table};

/// One invalid row found during screening.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Zero-based row index in the input table
    pub row: usize,
    /// The identifier cell as it appeared in the input
    pub identifier: String,
    pub validity: Validity,
}

/// Result of screening one table column.
#[derive(Debug, Clone, Serialize)]
pub struct Screening {
    pub total: usize,
    pub valid: usize,
    pub invalid_format: usize,
    pub invalid_checksum: usize,
    pub findings: Vec<Finding>,
    /// The invalid rows, original order and columns preserved; explicitly
    /// empty (headers only) when every row is valid
    #[serde(skip)]
    pub invalid_rows: Table,
}

impl Screening {
    pub fn all_valid(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Validate every row's identifier and collect the invalid ones.
///
/// Cells are trimmed of whitespace and surrounding quotes before validation
/// (spreadsheet exports wrap identifiers in quotes); the recorded identifier
/// is the cell as written. A missing cell counts as `InvalidFormat` for that
/// row only; a missing column fails the whole operation.
pub fn find_invalid(table: &Table, column: &str) -> Result<Screening> {
    let idx = table.column_index(column)?;

    let mut invalid_rows = table.empty_like();
    let mut findings = Vec::new();
    let mut valid = 0;
    let mut invalid_format = 0;
    let mut invalid_checksum = 0;

    for (i, row) in table.rows().iter().enumerate() {
        let raw = row.get(idx).map(String::as_str).unwrap_or("");
        let candidate = KeyNormalization::Trimmed.apply(raw);
        match validate(&candidate) {
            Validity::Valid => valid += 1,
            validity => {
                match validity {
                    Validity::InvalidFormat => invalid_format += 1,
                    Validity::InvalidChecksum => invalid_checksum += 1,
                    Validity::Valid => unreachable!(),
                }
                invalid_rows.push_row(row.clone());
                findings.push(Finding {
                    row: i,
                    identifier: raw.to_string(),
                    validity,
                });
            }
        }
    }

    Ok(Screening {
        total: table.len(),
        valid,
        invalid_format,
        invalid_checksum,
        findings,
        invalid_rows,
    })
}
