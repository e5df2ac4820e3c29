use chrono::NaiveDateTime;
use serde::Serialize;

use super::date::parse_report_date;
use crate::models::ReportSnapshot;

/// Label shown for the column that collects undated reports.
pub const UNDATED_LABEL: &str = "Unknown date";

/// One comparison column: every report that shares a raw date string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateColumn {
    /// Raw date string shared by the members; `None` for undated reports.
    pub label: Option<String>,
    /// Used for ordering only.
    pub resolved_date: NaiveDateTime,
    /// Indices into the session's report list, in sorted order.
    pub member_report_indices: Vec<usize>,
}

impl DateColumn {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(UNDATED_LABEL)
    }
}

/// Report indices ordered by resolved date. Stable: equal dates (and all
/// undated reports) keep their input order.
pub fn order_reports(reports: &[ReportSnapshot]) -> Vec<usize> {
    let mut keyed: Vec<(NaiveDateTime, usize)> = reports
        .iter()
        .enumerate()
        .map(|(idx, r)| (parse_report_date(r.date()), idx))
        .collect();
    // sort_by is stable; comparing dates only keeps input order among ties
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, idx)| idx).collect()
}

/// Group date-ordered reports into columns by raw date-string equality.
///
/// Two spellings of the same calendar day ("01.01.2024", "2024-01-01") stay
/// separate columns.
pub fn group_into_columns(reports: &[ReportSnapshot], ordered: &[usize]) -> Vec<DateColumn> {
    let mut columns: Vec<DateColumn> = Vec::new();

    for &idx in ordered {
        let Some(report) = reports.get(idx) else {
            continue;
        };
        let label = report.date();
        match columns.iter_mut().find(|c| c.label.as_deref() == label) {
            Some(column) => column.member_report_indices.push(idx),
            None => columns.push(DateColumn {
                label: label.map(str::to_string),
                resolved_date: parse_report_date(label),
                member_report_indices: vec![idx],
            }),
        }
    }

    columns.sort_by(|a, b| a.resolved_date.cmp(&b.resolved_date));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInfo;

    fn report(date: Option<&str>, file: &str) -> ReportSnapshot {
        ReportSnapshot {
            tests: vec![],
            patient_info: Some(PatientInfo {
                date: date.map(str::to_string),
                ..Default::default()
            }),
            source_file_name: Some(file.to_string()),
        }
    }

    #[test]
    fn orders_by_parsed_date() {
        let reports = vec![
            report(Some("15.02.2024"), "b"),
            report(Some("2023-12-01"), "a"),
            report(Some("01.03.2024"), "c"),
        ];
        assert_eq!(order_reports(&reports), vec![1, 0, 2]);
    }

    #[test]
    fn ordering_is_stable_for_ties_and_undated() {
        let reports = vec![
            report(Some("01.01.2024"), "first"),
            report(None, "undated-1"),
            report(Some("01.01.2024"), "second"),
            report(Some("nonsense"), "undated-2"),
            report(None, "undated-3"),
        ];
        assert_eq!(order_reports(&reports), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn same_raw_date_merges_into_one_column() {
        let reports = vec![
            report(Some("01.01.2024"), "a"),
            report(Some("01.01.2024"), "b"),
            report(Some("15.02.2024"), "c"),
        ];
        let ordered = order_reports(&reports);
        let columns = group_into_columns(&reports, &ordered);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].label.as_deref(), Some("01.01.2024"));
        assert_eq!(columns[0].member_report_indices, vec![0, 1]);
        assert_eq!(columns[1].member_report_indices, vec![2]);
    }

    #[test]
    fn different_spellings_of_same_day_stay_separate() {
        let reports = vec![
            report(Some("01.01.2024"), "a"),
            report(Some("2024-01-01"), "b"),
        ];
        let ordered = order_reports(&reports);
        let columns = group_into_columns(&reports, &ordered);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].resolved_date, columns[1].resolved_date);
        assert_eq!(columns[0].label.as_deref(), Some("01.01.2024"));
    }

    #[test]
    fn same_day_dotted_reports_order_by_time() {
        let reports = vec![
            report(Some("15.02.2024 18:00"), "evening"),
            report(Some("15.02.2024 08:00"), "morning"),
        ];
        let ordered = order_reports(&reports);
        assert_eq!(ordered, vec![1, 0]);
        let columns = group_into_columns(&reports, &ordered);
        let labels: Vec<&str> = columns.iter().map(|c| c.display_label()).collect();
        assert_eq!(labels, vec!["15.02.2024 08:00", "15.02.2024 18:00"]);
    }

    #[test]
    fn undated_reports_share_a_leading_column() {
        let reports = vec![
            report(Some("01.01.2024"), "a"),
            report(None, "b"),
            report(Some("  "), "c"),
        ];
        let ordered = order_reports(&reports);
        let columns = group_into_columns(&reports, &ordered);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].label, None);
        assert_eq!(columns[0].display_label(), UNDATED_LABEL);
        assert_eq!(columns[0].member_report_indices, vec![1, 2]);
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert!(group_into_columns(&[], &[]).is_empty());
    }
}
