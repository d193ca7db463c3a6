//! Compiler options (response file) scanning
//!
//! Only two lines are meaningful: `-langVersion:10` and `-langVersion:preview`,
//! compared after trimming and without regard to case. Everything else in the file
//! is ignored.

use lazy_static::lazy_static;
use regex::Regex;

/// A language version requested by the options file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangVersionRequest {
    /// `-langVersion:10`
    Version10,
    /// `-langVersion:preview`
    Preview,
}

impl LangVersionRequest {
    /// The `LangVersion` value written to the project for this request
    pub fn project_value(self) -> &'static str {
        match self {
            LangVersionRequest::Version10 => "10.0",
            LangVersionRequest::Preview => "11.0",
        }
    }
}

/// Which recognized options appear in an options file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsScan {
    pub version10: bool,
    pub preview: bool,
}

impl OptionsScan {
    /// The request to apply, if any
    ///
    /// Version 10 takes priority when both options are present.
    pub fn request(&self) -> Option<LangVersionRequest> {
        if self.version10 {
            Some(LangVersionRequest::Version10)
        } else if self.preview {
            Some(LangVersionRequest::Preview)
        } else {
            None
        }
    }
}

/// Classify a single options line
fn classify_line(line: &str) -> Option<LangVersionRequest> {
    lazy_static! {
        static ref LANG_VERSION_RE: Regex = Regex::new(r"(?i)^-langVersion:(10|preview)$").unwrap();
    }

    let caps = LANG_VERSION_RE.captures(line.trim())?;
    if caps[1].eq_ignore_ascii_case("preview") {
        Some(LangVersionRequest::Preview)
    } else {
        Some(LangVersionRequest::Version10)
    }
}

/// Scan the lines of an options file for language version requests
pub fn scan_options<I, S>(lines: I) -> OptionsScan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scan = OptionsScan::default();
    for line in lines {
        match classify_line(line.as_ref()) {
            Some(LangVersionRequest::Version10) => scan.version10 = true,
            Some(LangVersionRequest::Preview) => scan.preview = true,
            None => {}
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_tokens() {
        assert_eq!(
            classify_line("-langVersion:10"),
            Some(LangVersionRequest::Version10)
        );
        assert_eq!(
            classify_line("-langVersion:preview"),
            Some(LangVersionRequest::Preview)
        );
    }

    #[test]
    fn test_classify_trims_and_ignores_case() {
        assert_eq!(
            classify_line("  -LANGVERSION:10  "),
            Some(LangVersionRequest::Version10)
        );
        assert_eq!(
            classify_line("\t-LangVersion:PREVIEW\r"),
            Some(LangVersionRequest::Preview)
        );
    }

    #[test]
    fn test_classify_rejects_other_lines() {
        assert_eq!(classify_line("-langVersion:9"), None);
        assert_eq!(classify_line("-langVersion:100"), None);
        assert_eq!(classify_line("-langVersion:latest"), None);
        assert_eq!(classify_line("-nullable:enable -langVersion:10"), None);
        assert_eq!(classify_line("/langVersion:10"), None);
        assert_eq!(classify_line(""), None);
    }

    #[test]
    fn test_scan_empty_file() {
        let scan = scan_options(Vec::<String>::new());
        assert_eq!(scan, OptionsScan::default());
        assert_eq!(scan.request(), None);
    }

    #[test]
    fn test_scan_ignores_unrelated_options() {
        let scan = scan_options(["-nullable:enable", "-warnaserror+", "-define:UNITY"]);
        assert_eq!(scan.request(), None);
    }

    #[test]
    fn test_scan_preview() {
        let scan = scan_options(["-nullable:enable", "-langVersion:preview"]);
        assert!(scan.preview);
        assert!(!scan.version10);
        assert_eq!(scan.request(), Some(LangVersionRequest::Preview));
    }

    #[test]
    fn test_version10_wins_over_preview() {
        let scan = scan_options(["-langVersion:preview", "-langVersion:10"]);
        assert!(scan.preview && scan.version10);
        assert_eq!(scan.request(), Some(LangVersionRequest::Version10));
    }

    #[test]
    fn test_project_values() {
        assert_eq!(LangVersionRequest::Version10.project_value(), "10.0");
        assert_eq!(LangVersionRequest::Preview.project_value(), "11.0");
    }
}
