use std::collections::BTreeSet;

use super::ExportError;
use crate::comparison::ComparisonMatrix;
use crate::models::TestObservation;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Marker for cells with no observation.
const CSV_ABSENT: &str = "-";

/// Semicolon-separated CSV with a UTF-8 BOM (spreadsheet apps pick the
/// encoding from it). Header: `Test;Reference;Unit;<dates…>`.
pub fn export_csv(
    matrix: &ComparisonMatrix,
    selected: &BTreeSet<String>,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(UTF8_BOM.to_vec());

    let mut header = vec![
        "Test".to_string(),
        "Reference".to_string(),
        "Unit".to_string(),
    ];
    header.extend(matrix.columns().iter().map(|c| c.display_label().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| ExportError::Csv(e.to_string()))?;

    for test in matrix.filter_categories(selected) {
        let mut record = vec![
            test.canonical_name.clone(),
            test.reference_range.clone(),
            test.unit.clone(),
        ];
        record.extend((0..matrix.columns().len()).map(|col| {
            matrix
                .lookup(&test.canonical_name, col)
                .map(csv_cell)
                .unwrap_or_else(|| CSV_ABSENT.to_string())
        }));
        writer
            .write_record(&record)
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

fn csv_cell(obs: &TestObservation) -> String {
    let value = obs.value.display();
    match obs.status.marker() {
        Some(marker) => format!("{value} {marker}"),
        None => value,
    }
}
