pub const NORMALIZATION_SYSTEM_PROMPT: &str = r#"
You are a laboratory terminology assistant. Your ONLY role is to recognise
when differently written blood-test names refer to the same clinical
parameter.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Group names that differ only in spelling, language, abbreviation, casing,
   punctuation or a parenthesised abbreviation (e.g. "Hemoglobin (Hb)" and
   "Hemoglobin (HGB)").
2. NEVER group different parameters, even when related (e.g. LDL and HDL,
   absolute and percentage leukocyte counts).
3. For each group, choose ONE label: the clearest full name among the inputs.
4. Every input name MUST appear exactly once as a key in the output.
5. Output ONLY a JSON object. No commentary.
"#;

/// Build the clustering prompt for a sorted, de-duplicated list of names.
pub fn build_normalization_prompt(names: &[String]) -> String {
    let listed = names
        .iter()
        .map(|n| format!("- {}", n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<test_names>
{listed}
</test_names>

Return a JSON object mapping every test name above (exactly as written) to
its chosen group label, for example:

```json
{{
  "Hemoglobin (Hb)": "Hemoglobin",
  "Hemoglobin (HGB)": "Hemoglobin",
  "Glucose": "Glucose"
}}
```"#
    )
}
