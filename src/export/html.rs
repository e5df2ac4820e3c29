//! Static, self-contained HTML report (also the input to PDF rendering).

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::abbreviations;
use crate::comparison::{CanonicalTest, ComparisonMatrix, ABSENT_MARKER};
use crate::models::{TestStatus, Trend};

/// How a section recognises its tests by category label.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryMatcher {
    /// Category equals one of these (case-insensitive).
    AnyOf(Vec<String>),
    /// Category contains one of these (case-insensitive).
    Containing(Vec<String>),
}

impl CategoryMatcher {
    pub fn any_of(labels: &[&str]) -> Self {
        Self::AnyOf(labels.iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn containing(keywords: &[&str]) -> Self {
        Self::Containing(keywords.iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn matches(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        match self {
            Self::AnyOf(labels) => labels.iter().any(|l| *l == category),
            Self::Containing(keywords) => keywords.iter().any(|k| category.contains(k.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub matcher: CategoryMatcher,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, matcher: CategoryMatcher) -> Self {
        Self {
            title: title.into(),
            matcher,
        }
    }
}

/// Ordered sections; the first matching section takes a test, anything
/// unmatched lands in the fallback section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayout {
    pub sections: Vec<ReportSection>,
    pub fallback_title: String,
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self {
            sections: vec![
                ReportSection::new(
                    "Hematology",
                    CategoryMatcher::containing(&[
                        "hematolog",
                        "haematolog",
                        "blood count",
                        "cbc",
                        "leukocyte",
                        "erythrocyte",
                        "platelet",
                    ]),
                ),
                ReportSection::new(
                    "Biochemistry",
                    CategoryMatcher::containing(&[
                        "biochem",
                        "chemistry",
                        "lipid",
                        "liver",
                        "kidney",
                        "renal",
                        "electrolyte",
                        "glucose",
                        "metabolic",
                        "enzyme",
                        "total protein",
                        "serum protein",
                        "plasma protein",
                        "protein electrophoresis",
                        "iron",
                    ]),
                ),
                ReportSection::new(
                    "Coagulation",
                    CategoryMatcher::containing(&["coagul", "hemostas", "haemostas", "clotting"]),
                ),
            ],
            fallback_title: "Other".to_string(),
        }
    }
}

impl SectionLayout {
    /// Group tests by section, in layout order, fallback last. Empty sections
    /// are left out.
    pub fn partition<'a>(&self, tests: &[&'a CanonicalTest]) -> Vec<(&str, Vec<&'a CanonicalTest>)> {
        let mut buckets: Vec<Vec<&'a CanonicalTest>> = vec![Vec::new(); self.sections.len() + 1];
        for &test in tests {
            let slot = self
                .sections
                .iter()
                .position(|s| s.matcher.matches(&test.category))
                .unwrap_or(self.sections.len());
            buckets[slot].push(test);
        }

        self.sections
            .iter()
            .map(|s| s.title.as_str())
            .chain(std::iter::once(self.fallback_title.as_str()))
            .zip(buckets)
            .filter(|(_, tests)| !tests.is_empty())
            .collect()
    }
}

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif; margin: 24px; color: #1f2933; }
h1 { font-size: 22px; margin-bottom: 4px; }
.meta { color: #616e7c; font-size: 13px; margin-bottom: 20px; }
h2 { font-size: 16px; margin: 24px 0 8px; border-bottom: 2px solid #3e4c59; padding-bottom: 4px; }
table { border-collapse: collapse; width: 100%; font-size: 12px; page-break-inside: auto; }
th, td { border: 1px solid #cbd2d9; padding: 4px 6px; text-align: left; }
th { background: #f5f7fa; }
tr { page-break-inside: avoid; }
.hint { color: #7b8794; font-size: 11px; }
.high { color: #c81e1e; font-weight: 600; }
.low { color: #1e5ac8; font-weight: 600; }
.absent { color: #9aa5b1; }
.trend { margin-left: 4px; color: #52606d; }
.print { margin-bottom: 16px; padding: 6px 14px; cursor: pointer; }
@media print { .print { display: none; } body { margin: 0; } }
"#;

/// Render the comparison as a standalone HTML document.
pub fn export_html(
    matrix: &ComparisonMatrix,
    selected: &BTreeSet<String>,
    layout: &SectionLayout,
    generated_on: NaiveDate,
) -> String {
    let tests = matrix.filter_categories(selected);
    let dates: Vec<&str> = matrix.columns().iter().map(|c| c.display_label()).collect();

    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Blood Test Comparison</title>\n<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str("<button class=\"print\" onclick=\"window.print()\">Print</button>\n");
    out.push_str("<h1>Blood Test Comparison</h1>\n");

    let _ = write!(
        out,
        "<div class=\"meta\">Generated {} · {} tests · {} dates",
        generated_on.format("%Y-%m-%d"),
        tests.len(),
        dates.len()
    );
    if let Some(patient) = patient_name(matrix) {
        let _ = write!(out, " · Patient: {}", escape_html(patient));
    }
    out.push_str("</div>\n");

    for (title, section_tests) in layout.partition(&tests) {
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(title));
        out.push_str("<table>\n<thead><tr><th>Test</th><th>Unit</th><th>Reference</th>");
        for date in &dates {
            let _ = write!(out, "<th>{}</th>", escape_html(date));
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for test in section_tests {
            render_row(&mut out, matrix, test, dates.len());
        }
        out.push_str("</tbody>\n</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_row(out: &mut String, matrix: &ComparisonMatrix, test: &CanonicalTest, columns: usize) {
    out.push_str("<tr><td>");
    out.push_str(&escape_html(&test.canonical_name));
    if let Some(full) = abbreviations::expand_name(&test.canonical_name) {
        let _ = write!(out, " <span class=\"hint\">({})</span>", escape_html(full));
    }
    let _ = write!(
        out,
        "</td><td>{}</td><td>{}</td>",
        escape_html(&test.unit),
        escape_html(&test.reference_range)
    );

    for col in 0..columns {
        match matrix.lookup(&test.canonical_name, col) {
            None => {
                let _ = write!(out, "<td class=\"absent\">{ABSENT_MARKER}</td>");
            }
            Some(obs) => {
                let class = match obs.status {
                    TestStatus::High => " class=\"high\"",
                    TestStatus::Low => " class=\"low\"",
                    TestStatus::Normal => "",
                };
                let _ = write!(out, "<td{}>{}", class, escape_html(&obs.value.display()));
                if let Some(marker) = obs.status.marker() {
                    let _ = write!(out, " {marker}");
                }
                let trend = matrix.trend(&test.canonical_name, col);
                if trend != Trend::None {
                    let _ = write!(
                        out,
                        "<span class=\"trend\" title=\"{}\">{}</span>",
                        trend.as_str(),
                        trend.arrow()
                    );
                }
                out.push_str("</td>");
            }
        }
    }
    out.push_str("</tr>\n");
}

/// First patient name found in date order.
fn patient_name(matrix: &ComparisonMatrix) -> Option<&str> {
    matrix
        .columns()
        .iter()
        .flat_map(|c| c.member_report_indices.iter())
        .filter_map(|&idx| matrix.reports().get(idx))
        .filter_map(|r| r.patient_info.as_ref())
        .find_map(|p| p.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::engine::tests::{hemoglobin_reports, obs, report};
    use crate::comparison::{reconcile, NameMapping};
    use crate::models::{PatientInfo, TestValue};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn canonical(name: &str, category: &str) -> CanonicalTest {
        CanonicalTest {
            canonical_name: name.into(),
            category: category.into(),
            unit: String::new(),
            reference_range: String::new(),
            original_names: vec![name.into()],
        }
    }

    #[test]
    fn matchers_are_case_insensitive() {
        assert!(CategoryMatcher::any_of(&["Lipid Profile"]).matches(" lipid profile "));
        assert!(!CategoryMatcher::any_of(&["Lipid Profile"]).matches("Lipids"));
        assert!(CategoryMatcher::containing(&["coagul"]).matches("Coagulation panel"));
    }

    #[test]
    fn default_layout_partitions_into_fixed_sections() {
        let tests = [
            canonical("INR", "Coagulation"),
            canonical("WBC", "Complete Blood Count"),
            canonical("LDL", "Lipid Profile"),
            canonical("TSH", "Hormones"),
            canonical("PLT", "Hematology"),
        ];
        let refs: Vec<&CanonicalTest> = tests.iter().collect();
        let layout = SectionLayout::default();
        let sections = layout.partition(&refs);

        let titles: Vec<&str> = sections.iter().map(|(t, _)| *t).collect();
        assert_eq!(titles, vec!["Hematology", "Biochemistry", "Coagulation", "Other"]);
        let hematology: Vec<&str> = sections[0].1.iter().map(|t| t.canonical_name.as_str()).collect();
        assert_eq!(hematology, vec!["WBC", "PLT"]);
        assert_eq!(sections[3].1[0].canonical_name, "TSH");
    }

    #[test]
    fn coagulation_protein_categories_stay_in_coagulation() {
        let tests = [
            canonical("Protein C", "Coagulation proteins"),
            canonical("Fibrinogen", "Coagulation Factors"),
            canonical("Albumin", "Serum Proteins"),
            canonical("TP", "Total Protein"),
        ];
        let refs: Vec<&CanonicalTest> = tests.iter().collect();
        let layout = SectionLayout::default();
        let sections = layout.partition(&refs);

        let titles: Vec<&str> = sections.iter().map(|(t, _)| *t).collect();
        assert_eq!(titles, vec!["Biochemistry", "Coagulation"]);
        let coagulation: Vec<&str> = sections[1].1.iter().map(|t| t.canonical_name.as_str()).collect();
        assert_eq!(coagulation, vec!["Protein C", "Fibrinogen"]);
        assert_eq!(sections[0].1.len(), 2);
    }

    #[test]
    fn custom_layout_first_match_wins_and_empty_sections_drop() {
        let layout = SectionLayout {
            sections: vec![
                ReportSection::new("Lipids", CategoryMatcher::containing(&["lipid"])),
                ReportSection::new("Everything", CategoryMatcher::containing(&[""])),
                ReportSection::new("Never", CategoryMatcher::any_of(&["nothing"])),
            ],
            fallback_title: "Rest".into(),
        };
        let tests = [canonical("LDL", "Lipid Profile"), canonical("ALT", "Liver")];
        let refs: Vec<&CanonicalTest> = tests.iter().collect();
        let sections = layout.partition(&refs);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "Lipids");
        assert_eq!(sections[1].0, "Everything");
        assert_eq!(sections[1].1[0].canonical_name, "ALT");
    }

    #[test]
    fn document_is_self_contained_with_print_button() {
        let matrix = reconcile(hemoglobin_reports(), NameMapping::new());
        let html = export_html(&matrix, &BTreeSet::new(), &SectionLayout::default(), day());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("window.print()"));
        assert!(html.contains("<h2>Hematology</h2>"));
        assert!(html.contains("<th>15.02.2024</th>"));
        assert!(html.contains("title=\"down\""));
        assert!(!html.contains("<script src"));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn text_is_escaped_and_abnormal_values_marked() {
        let mut high = obs("<b>Glucose</b>", TestValue::Number(9.1), "Biochemistry");
        high.status = TestStatus::High;
        let mut snapshot = report(Some("01.01.2024"), vec![high, obs("ALT", TestValue::Number(20.0), "Liver")]);
        snapshot.patient_info = Some(PatientInfo {
            name: Some("O'Brien & Co".into()),
            date: Some("01.01.2024".into()),
            ..Default::default()
        });
        let matrix = reconcile(vec![snapshot], NameMapping::new());
        let html = export_html(&matrix, &BTreeSet::new(), &SectionLayout::default(), day());

        assert!(html.contains("&lt;b&gt;Glucose&lt;/b&gt;"));
        assert!(!html.contains("<b>Glucose</b>"));
        assert!(html.contains("<td class=\"high\">9.1 ↑"));
        assert!(html.contains("Patient: O&#39;Brien &amp; Co"));
        assert!(html.contains("(Alanine aminotransferase)"));
    }

    #[test]
    fn absent_cells_render_marker() {
        let reports = vec![
            report(Some("01.01.2024"), vec![obs("WBC", TestValue::Number(6.0), "Hematology")]),
            report(Some("02.01.2024"), vec![]),
        ];
        let matrix = reconcile(reports, NameMapping::new());
        let html = export_html(&matrix, &BTreeSet::new(), &SectionLayout::default(), day());
        assert!(html.contains("<td class=\"absent\">—</td>"));
    }
}
