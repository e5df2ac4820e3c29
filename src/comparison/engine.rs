//! Reconciliation: canonical test table + date columns + per-cell lookup.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::columns::{group_into_columns, order_reports, DateColumn};
use super::mapping::NameMapping;
use super::trend::compute_trend;
use crate::models::{ReportSnapshot, TestObservation, Trend};

/// All spellings of one clinical parameter across the session's reports.
///
/// Metadata comes from the first observation met in date order; later
/// conflicting units or ranges are not reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTest {
    pub canonical_name: String,
    pub category: String,
    pub unit: String,
    pub reference_range: String,
    /// Raw names mapped to this test, first-seen order, no duplicates.
    pub original_names: Vec<String>,
}

/// The comparison matrix: canonical tests × date columns.
#[derive(Debug, Clone)]
pub struct ComparisonMatrix {
    reports: Vec<ReportSnapshot>,
    mapping: NameMapping,
    columns: Vec<DateColumn>,
    tests: Vec<CanonicalTest>,
}

/// Every distinct raw test name across the reports, sorted.
pub fn collect_raw_names(reports: &[ReportSnapshot]) -> BTreeSet<String> {
    reports
        .iter()
        .flat_map(|r| r.tests.iter())
        .map(|t| t.name.clone())
        .collect()
}

/// Build the comparison matrix from the session's reports and a name mapping.
///
/// The mapping is completed with identity entries so every raw name present
/// has a canonical name.
pub fn reconcile(reports: Vec<ReportSnapshot>, mut mapping: NameMapping) -> ComparisonMatrix {
    let raw_names = collect_raw_names(&reports);
    mapping.complete_with_identity(raw_names.iter().map(String::as_str));

    let ordered = order_reports(&reports);
    let columns = group_into_columns(&reports, &ordered);

    let mut tests: Vec<CanonicalTest> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &report_idx in &ordered {
        for obs in &reports[report_idx].tests {
            let canonical = mapping.resolve(&obs.name);
            match index.get(canonical) {
                Some(&pos) => {
                    let test = &mut tests[pos];
                    if !test.original_names.iter().any(|n| n == &obs.name) {
                        test.original_names.push(obs.name.clone());
                    }
                }
                None => {
                    index.insert(canonical.to_string(), tests.len());
                    tests.push(CanonicalTest {
                        canonical_name: canonical.to_string(),
                        category: obs.category.clone(),
                        unit: obs.unit.clone(),
                        reference_range: obs.reference_range.clone(),
                        original_names: vec![obs.name.clone()],
                    });
                }
            }
        }
    }

    tracing::debug!(
        reports = reports.len(),
        raw_names = raw_names.len(),
        canonical_tests = tests.len(),
        columns = columns.len(),
        "Reconciled comparison matrix"
    );

    ComparisonMatrix {
        reports,
        mapping,
        columns,
        tests,
    }
}

impl ComparisonMatrix {
    pub fn columns(&self) -> &[DateColumn] {
        &self.columns
    }

    pub fn tests(&self) -> &[CanonicalTest] {
        &self.tests
    }

    pub fn reports(&self) -> &[ReportSnapshot] {
        &self.reports
    }

    pub fn mapping(&self) -> &NameMapping {
        &self.mapping
    }

    pub fn test(&self, canonical: &str) -> Option<&CanonicalTest> {
        self.tests.iter().find(|t| t.canonical_name == canonical)
    }

    /// Value of `canonical` in column `column`: the first matching observation
    /// among the column's reports, in member order. Absent cells (and
    /// out-of-range columns) are `None`.
    pub fn lookup(&self, canonical: &str, column: usize) -> Option<&TestObservation> {
        let column = self.columns.get(column)?;
        column
            .member_report_indices
            .iter()
            .filter_map(|&idx| self.reports.get(idx))
            .find_map(|report| {
                report
                    .tests
                    .iter()
                    .find(|obs| self.mapping.resolve(&obs.name) == canonical)
            })
    }

    /// Trend of `canonical` from column `column - 1` to `column`.
    pub fn trend(&self, canonical: &str, column: usize) -> Trend {
        if column == 0 {
            return Trend::None;
        }
        compute_trend(
            self.lookup(canonical, column).map(|o| &o.value),
            self.lookup(canonical, column - 1).map(|o| &o.value),
        )
    }

    /// Distinct non-empty categories, first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for test in &self.tests {
            let category = test.category.trim();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Tests whose category is in `selected`. An empty selection keeps all.
    pub fn filter_categories(&self, selected: &BTreeSet<String>) -> Vec<&CanonicalTest> {
        if selected.is_empty() {
            return self.tests.iter().collect();
        }
        self.tests
            .iter()
            .filter(|t| selected.contains(t.category.trim()))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{PatientInfo, TestStatus, TestValue};

    pub(crate) fn obs(name: &str, value: TestValue, category: &str) -> TestObservation {
        TestObservation {
            name: name.to_string(),
            value,
            unit: "g/dL".to_string(),
            reference_range: "12-16".to_string(),
            status: TestStatus::Normal,
            category: category.to_string(),
        }
    }

    pub(crate) fn report(date: Option<&str>, tests: Vec<TestObservation>) -> ReportSnapshot {
        ReportSnapshot {
            tests,
            patient_info: Some(PatientInfo {
                date: date.map(str::to_string),
                ..Default::default()
            }),
            source_file_name: None,
        }
    }

    /// Three reports: two on 01.01.2024, one on 15.02.2024.
    pub(crate) fn hemoglobin_reports() -> Vec<ReportSnapshot> {
        vec![
            report(
                Some("01.01.2024"),
                vec![obs("Hemoglobin", TestValue::Number(13.0), "Hematology")],
            ),
            report(
                Some("01.01.2024"),
                vec![obs("Hemoglobin", TestValue::Number(13.0), "Hematology")],
            ),
            report(
                Some("15.02.2024"),
                vec![obs("Hemoglobin", TestValue::Number(10.0), "Hematology")],
            ),
        ]
    }

    #[test]
    fn same_day_reports_merge_and_trend_down() {
        let matrix = reconcile(hemoglobin_reports(), NameMapping::new());
        assert_eq!(matrix.columns().len(), 2);
        assert_eq!(matrix.columns()[0].member_report_indices, vec![0, 1]);
        assert_eq!(
            matrix.lookup("Hemoglobin", 0).map(|o| o.value.clone()),
            Some(TestValue::Number(13.0))
        );
        assert_eq!(
            matrix.lookup("Hemoglobin", 1).map(|o| o.value.clone()),
            Some(TestValue::Number(10.0))
        );
        assert_eq!(matrix.trend("Hemoglobin", 0), Trend::None);
        assert_eq!(matrix.trend("Hemoglobin", 1), Trend::Down);
    }

    #[test]
    fn first_match_wins_within_a_column() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("Glucose", TestValue::Number(90.0), "Biochemistry")],
            ),
            report(
                Some("01.01.2024"),
                vec![obs("Glucose", TestValue::Number(120.0), "Biochemistry")],
            ),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(
            matrix.lookup("Glucose", 0).map(|o| o.value.clone()),
            Some(TestValue::Number(90.0))
        );
    }

    #[test]
    fn synonyms_collapse_into_one_canonical_test() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("Hemoglobin (Hb)", TestValue::Number(13.0), "Hematology")],
            ),
            report(
                Some("15.02.2024"),
                vec![obs("Hemoglobin (HGB)", TestValue::Number(14.0), "Blood")],
            ),
        ];
        let mut mapping = NameMapping::new();
        mapping.insert("Hemoglobin (Hb)", "Hemoglobin");
        mapping.insert("Hemoglobin (HGB)", "Hemoglobin");

        let matrix = reconcile(reports, mapping);
        assert_eq!(matrix.tests().len(), 1);
        let test = &matrix.tests()[0];
        assert_eq!(test.canonical_name, "Hemoglobin");
        assert_eq!(test.category, "Hematology");
        assert_eq!(test.original_names, vec!["Hemoglobin (Hb)", "Hemoglobin (HGB)"]);
        assert_eq!(matrix.trend("Hemoglobin", 1), Trend::Up);
    }

    #[test]
    fn metadata_comes_from_earliest_report() {
        let mut late = obs("Ferritin", TestValue::Number(40.0), "Iron");
        late.unit = "ng/mL".into();
        let mut early = obs("Ferritin", TestValue::Number(30.0), "Iron studies");
        early.unit = "µg/L".into();
        // Later report listed first: sorting must still pick the early one.
        let reports = vec![
            report(Some("2024-05-01"), vec![late]),
            report(Some("2024-01-01"), vec![early]),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(matrix.tests()[0].unit, "µg/L");
        assert_eq!(matrix.tests()[0].category, "Iron studies");
    }

    #[test]
    fn identity_mapping_keeps_every_raw_name() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("Hemoglobin (Hb)", TestValue::Number(13.0), "Hematology")],
            ),
            report(
                Some("15.02.2024"),
                vec![obs("Hemoglobin (HGB)", TestValue::Number(14.0), "Hematology")],
            ),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(matrix.tests().len(), 2);
        assert_eq!(matrix.mapping().len(), 2);
        assert_eq!(matrix.mapping().resolve("Hemoglobin (HGB)"), "Hemoglobin (HGB)");
    }

    #[test]
    fn sparse_tests_keep_their_row() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("Vitamin D", TestValue::Number(20.0), "Vitamins")],
            ),
            report(
                Some("15.02.2024"),
                vec![obs("Glucose", TestValue::Number(95.0), "Biochemistry")],
            ),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(matrix.tests().len(), 2);
        assert!(matrix.lookup("Vitamin D", 1).is_none());
        assert_eq!(matrix.trend("Vitamin D", 1), Trend::None);
    }

    #[test]
    fn lookup_never_panics_on_unknown_input() {
        let matrix = reconcile(hemoglobin_reports(), NameMapping::new());
        assert!(matrix.lookup("Nonexistent", 0).is_none());
        assert!(matrix.lookup("Hemoglobin", 99).is_none());
        assert_eq!(matrix.trend("Hemoglobin", 99), Trend::None);
    }

    #[test]
    fn text_results_have_no_trend() {
        let reports = vec![
            report(
                Some("01.01.2024"),
                vec![obs("HBsAg", TestValue::Text("negative".into()), "Serology")],
            ),
            report(
                Some("15.02.2024"),
                vec![obs("HBsAg", TestValue::Text("positive".into()), "Serology")],
            ),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(matrix.trend("HBsAg", 1), Trend::None);
    }

    #[test]
    fn categories_and_filtering() {
        let reports = vec![report(
            Some("01.01.2024"),
            vec![
                obs("Hemoglobin", TestValue::Number(13.0), "Hematology"),
                obs("Glucose", TestValue::Number(90.0), "Biochemistry"),
                obs("WBC", TestValue::Number(6.0), "Hematology"),
                obs("Note", TestValue::Text("ok".into()), ""),
            ],
        )];
        let matrix = reconcile(reports, NameMapping::new());
        assert_eq!(matrix.categories(), vec!["Hematology", "Biochemistry"]);

        let all = matrix.filter_categories(&BTreeSet::new());
        assert_eq!(all.len(), 4);

        let selected: BTreeSet<String> = ["Hematology".to_string()].into_iter().collect();
        let names: Vec<&str> = matrix
            .filter_categories(&selected)
            .into_iter()
            .map(|t| t.canonical_name.as_str())
            .collect();
        assert_eq!(names, vec!["Hemoglobin", "WBC"]);
    }

    #[test]
    fn empty_session_produces_empty_matrix() {
        let matrix = reconcile(vec![], NameMapping::new());
        assert!(matrix.columns().is_empty());
        assert!(matrix.tests().is_empty());
    }

    #[test]
    fn dotted_and_iso_times_give_the_same_trend() {
        for (later, earlier) in [
            ("15.02.2024 18:00", "15.02.2024 08:00"),
            ("2024-02-15 18:00:00", "2024-02-15 08:00:00"),
        ] {
            let reports = vec![
                report(Some(later), vec![obs("Glucose", TestValue::Number(150.0), "Biochemistry")]),
                report(Some(earlier), vec![obs("Glucose", TestValue::Number(90.0), "Biochemistry")]),
            ];
            let matrix = reconcile(reports, NameMapping::new());
            assert_eq!(matrix.columns()[0].display_label(), earlier);
            assert_eq!(matrix.trend("Glucose", 1), Trend::Up);
        }
    }
}
