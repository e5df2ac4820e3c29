use std::collections::BTreeSet;

use serde::Serialize;

use super::engine::{CanonicalTest, ComparisonMatrix};
use crate::abbreviations;
use crate::models::{TestStatus, Trend};

/// Shown in cells with no observation.
pub const ABSENT_MARKER: &str = "—";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub dates: Vec<String>,
    pub categories: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub name: String,
    pub full_name: Option<String>,
    pub category: String,
    pub unit: String,
    pub reference_range: String,
    pub original_names: Vec<String>,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub date: String,
    pub display: String,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub status: Option<TestStatus>,
    pub trend: Trend,
}

impl ComparisonMatrix {
    /// Rows for the interactive comparison table, restricted to `selected`
    /// categories (all when empty).
    pub fn table_view(&self, selected: &BTreeSet<String>) -> TableView {
        let dates: Vec<String> = self
            .columns()
            .iter()
            .map(|c| c.display_label().to_string())
            .collect();

        let rows = self
            .filter_categories(selected)
            .into_iter()
            .map(|test| self.table_row(test, &dates))
            .collect();

        TableView {
            categories: self.categories().into_iter().map(str::to_string).collect(),
            dates,
            rows,
        }
    }

    fn table_row(&self, test: &CanonicalTest, dates: &[String]) -> TableRow {
        let cells = dates
            .iter()
            .enumerate()
            .map(|(col, date)| match self.lookup(&test.canonical_name, col) {
                Some(obs) => TableCell {
                    date: date.clone(),
                    display: obs.value.display(),
                    value: Some(obs.value.display()),
                    unit: Some(obs.unit.clone()),
                    status: Some(obs.status),
                    trend: self.trend(&test.canonical_name, col),
                },
                None => TableCell {
                    date: date.clone(),
                    display: ABSENT_MARKER.to_string(),
                    value: None,
                    unit: None,
                    status: None,
                    trend: Trend::None,
                },
            })
            .collect();

        TableRow {
            name: test.canonical_name.clone(),
            full_name: abbreviations::expand_name(&test.canonical_name).map(str::to_string),
            category: test.category.clone(),
            unit: test.unit.clone(),
            reference_range: test.reference_range.clone(),
            original_names: test.original_names.clone(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::engine::tests::{hemoglobin_reports, obs, report};
    use crate::comparison::{reconcile, NameMapping};
    use crate::models::TestValue;

    #[test]
    fn table_has_one_cell_per_column() {
        let matrix = reconcile(hemoglobin_reports(), NameMapping::new());
        let view = matrix.table_view(&BTreeSet::new());
        assert_eq!(view.dates, vec!["01.01.2024", "15.02.2024"]);
        assert_eq!(view.rows.len(), 1);
        let row = &view.rows[0];
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[0].display, "13");
        assert_eq!(row.cells[1].trend, Trend::Down);
    }

    #[test]
    fn absent_cells_use_marker() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("WBC", TestValue::Number(6.1), "Hematology")],
            ),
            report(Some("02.02.2024"), vec![]),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        let view = matrix.table_view(&BTreeSet::new());
        let cell = &view.rows[0].cells[1];
        assert_eq!(cell.display, ABSENT_MARKER);
        assert!(cell.value.is_none());
        assert!(cell.status.is_none());
    }

    #[test]
    fn filter_limits_rows_but_not_categories() {
        let reports = vec![report(
            Some("01.01.2024"),
            vec![
                obs("WBC", TestValue::Number(6.1), "Hematology"),
                obs("ALT", TestValue::Number(30.0), "Biochemistry"),
            ],
        )];
        let matrix = reconcile(reports, NameMapping::new());
        let selected: BTreeSet<String> = ["Biochemistry".to_string()].into_iter().collect();
        let view = matrix.table_view(&selected);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "ALT");
        assert_eq!(view.rows[0].full_name.as_deref(), Some("Alanine aminotransferase"));
        assert_eq!(view.categories, vec!["Hematology", "Biochemistry"]);
    }

    #[test]
    fn serializes_camel_case() {
        let matrix = reconcile(hemoglobin_reports(), NameMapping::new());
        let json = serde_json::to_value(matrix.table_view(&BTreeSet::new())).unwrap();
        assert_eq!(json["rows"][0]["referenceRange"], "12-16");
        assert_eq!(json["rows"][0]["cells"][1]["trend"], "down");
    }
}
