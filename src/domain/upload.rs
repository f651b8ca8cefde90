// Upload naming rules
use chrono::NaiveDateTime;

pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Extension check on the client-supplied filename.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduce a client filename to a safe ASCII basename.
pub fn secure_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    let mut pending_space = false;
    for c in base.chars().filter(|c| c.is_ascii()) {
        if c.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push('_');
            pending_space = false;
        }
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Stored name: `<YYYYmmdd_HHMMSS>_<secure name>`.
pub fn stored_name(filename: &str, now: NaiveDateTime) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), secure_filename(filename))
}

/// A stored name is only ever a single path component produced by
/// [`stored_name`]; anything else read back from a client is rejected.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("report.xlsx"));
        assert!(allowed_file("report.xls"));
        assert!(allowed_file("REPORT.XLSX"));
        assert!(!allowed_file("report.csv"));
        assert!(!allowed_file("xlsx"));
        assert!(!allowed_file("report.xlsx.exe"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Sales Report.xlsx"), "My_Sales_Report.xlsx");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\q1 data.xls"), "q1_data.xls");
        assert_eq!(secure_filename("  résumé.xlsx"), "rsum.xlsx");
        assert_eq!(secure_filename("..."), "upload");
    }

    #[test]
    fn test_stored_name() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(stored_name("q1 data.xlsx", now), "20240131_090507_q1_data.xlsx");
    }

    #[test]
    fn test_is_valid_stored_name() {
        assert!(is_valid_stored_name("20240131_090507_q1_data.xlsx"));
        assert!(!is_valid_stored_name("../secret"));
        assert!(!is_valid_stored_name("a/b.xlsx"));
        assert!(!is_valid_stored_name(""));
    }
}
