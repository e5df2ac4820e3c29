use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `Content-Disposition` for a download: ASCII `report.<ext>` fallback plus
/// the real name as UTF-8 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("pdf");

    format!(
        "attachment; filename=\"report.{}\"; filename*=UTF-8''{}",
        extension.to_ascii_lowercase(),
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_name_passes_through() {
        assert_eq!(
            content_disposition("blood-test-comparison-2024-03-09.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''blood-test-comparison-2024-03-09.pdf"
        );
    }

    #[test]
    fn non_ascii_is_percent_encoded() {
        let header = content_disposition("Анализ крови.pdf");
        assert!(header.contains("filename=\"report.pdf\""));
        assert!(header.ends_with(
            "filename*=UTF-8''%D0%90%D0%BD%D0%B0%D0%BB%D0%B8%D0%B7%20%D0%BA%D1%80%D0%BE%D0%B2%D0%B8.pdf"
        ));
        assert!(header.is_ascii());
    }

    #[test]
    fn separators_and_quotes_are_encoded() {
        let header = content_disposition("a\"b;c.csv");
        assert!(header.contains("filename=\"report.csv\""));
        assert!(header.ends_with("a%22b%3Bc.csv"));
    }
}
