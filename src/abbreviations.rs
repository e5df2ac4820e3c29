//! Common laboratory abbreviations and their full names.
//!
//! Used for display hints only; never for matching or merging tests.

/// (abbreviation, full name). Keys compared case-insensitively.
const ABBREVIATIONS: &[(&str, &str)] = &[
    // Hematology
    ("HGB", "Hemoglobin"),
    ("HB", "Hemoglobin"),
    ("HCT", "Hematocrit"),
    ("RBC", "Red blood cells"),
    ("WBC", "White blood cells"),
    ("PLT", "Platelets"),
    ("MCV", "Mean corpuscular volume"),
    ("MCH", "Mean corpuscular hemoglobin"),
    ("MCHC", "Mean corpuscular hemoglobin concentration"),
    ("RDW", "Red cell distribution width"),
    ("MPV", "Mean platelet volume"),
    ("PCT", "Plateletcrit"),
    ("PDW", "Platelet distribution width"),
    ("NEU", "Neutrophils"),
    ("LYM", "Lymphocytes"),
    ("MON", "Monocytes"),
    ("EOS", "Eosinophils"),
    ("BAS", "Basophils"),
    ("ESR", "Erythrocyte sedimentation rate"),
    // Biochemistry
    ("ALT", "Alanine aminotransferase"),
    ("AST", "Aspartate aminotransferase"),
    ("GGT", "Gamma-glutamyl transferase"),
    ("ALP", "Alkaline phosphatase"),
    ("LDH", "Lactate dehydrogenase"),
    ("CK", "Creatine kinase"),
    ("BUN", "Blood urea nitrogen"),
    ("CRP", "C-reactive protein"),
    ("HBA1C", "Glycated hemoglobin"),
    ("LDL", "Low-density lipoprotein cholesterol"),
    ("HDL", "High-density lipoprotein cholesterol"),
    ("VLDL", "Very-low-density lipoprotein cholesterol"),
    ("TG", "Triglycerides"),
    ("TSH", "Thyroid-stimulating hormone"),
    ("FT3", "Free triiodothyronine"),
    ("FT4", "Free thyroxine"),
    ("EGFR", "Estimated glomerular filtration rate"),
    ("NA", "Sodium"),
    ("K", "Potassium"),
    ("CL", "Chloride"),
    ("CA", "Calcium"),
    ("MG", "Magnesium"),
    ("FE", "Iron"),
    ("TIBC", "Total iron-binding capacity"),
    ("PSA", "Prostate-specific antigen"),
    // Coagulation
    ("PT", "Prothrombin time"),
    ("INR", "International normalized ratio"),
    ("APTT", "Activated partial thromboplastin time"),
    ("PTT", "Partial thromboplastin time"),
    ("TT", "Thrombin time"),
    ("FIB", "Fibrinogen"),
];

/// Full name for an abbreviation such as "ALT" or "HbA1c".
pub fn lookup(abbreviation: &str) -> Option<&'static str> {
    let key = abbreviation.trim();
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(key))
        .map(|(_, full)| *full)
}

/// Full name for a test labelled only by its abbreviation, or by an
/// abbreviation in parentheses with nothing else ("(ALT)").
///
/// Names that already spell the test out return `None`.
pub fn expand_name(name: &str) -> Option<&'static str> {
    let trimmed = name.trim().trim_start_matches('(').trim_end_matches(')');
    lookup(trimmed)
}
