/// Response classification rules: indicator substrings, blocked status codes,
/// and the parameter names tried in discovery mode.
///
/// This is injected configuration rather than hard-coded logic so the
/// classifier and the target builder stay testable without network access,
/// and so operators can swap the lists from files.
#[derive(Debug, Clone)]
pub struct DetectionRules {
    /// Body substrings that signal file/config leakage.
    pub lfi_indicators: Vec<String>,
    /// Header/body substrings that signal a WAF or block page.
    pub waf_indicators: Vec<String>,
    /// Status codes treated as a block regardless of response content.
    pub blocked_status: Vec<u16>,
    /// Parameter names tried when the target URL has no query string.
    pub candidate_params: Vec<String>,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            lfi_indicators: to_strings(&["root:x:", "[boot]", "localhost"]),
            waf_indicators: to_strings(&[
                "cloudflare",
                "sucuri",
                "incapsula",
                "akamai",
                "mod_security",
                "waf",
                "denied",
                "forbidden",
                "error 403",
                "access denied",
            ]),
            blocked_status: vec![403, 406, 501],
            candidate_params: to_strings(&[
                "file", "page", "path", "dir", "include", "view", "document", "folder", "url",
                "cat",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Verdict for a single response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub vulnerable: bool,
    pub waf_detected: bool,
}

/// Classifies probe responses against a [`DetectionRules`] set.
pub struct Detector {
    rules: DetectionRules,
}

impl Detector {
    /// Indicators match case-insensitively; they are lower-cased once here so
    /// classification only lower-cases the response side.
    pub fn new(mut rules: DetectionRules) -> Self {
        for ind in rules
            .lfi_indicators
            .iter_mut()
            .chain(rules.waf_indicators.iter_mut())
        {
            *ind = ind.to_lowercase();
        }
        Self { rules }
    }

    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    /// Classifies one response.
    ///
    /// A missing status code means the request failed before any response was
    /// obtained — nothing is flagged and nothing panics in that case.
    /// Matching is case-insensitive substring and stops at the first hit.
    pub fn classify(
        &self,
        status: Option<u16>,
        headers: &[(String, String)],
        body: &str,
    ) -> Classification {
        let Some(status) = status else {
            return Classification::default();
        };

        let body = body.to_lowercase();

        let vulnerable = self
            .rules
            .lfi_indicators
            .iter()
            .any(|ind| body.contains(ind.as_str()));

        let waf_detected = self.rules.blocked_status.contains(&status) || {
            let header_blob = headers
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            self.rules
                .waf_indicators
                .iter()
                .any(|sig| header_blob.contains(sig.as_str()) || body.contains(sig.as_str()))
        };

        Classification {
            vulnerable,
            waf_detected,
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DetectionRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_headers() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_passwd_body_is_vulnerable() {
        let detector = Detector::default();
        let verdict = detector.classify(Some(200), &no_headers(), "root:x:0:0");
        assert!(verdict.vulnerable);
        assert!(!verdict.waf_detected);
    }

    #[test]
    fn test_indicator_match_is_case_insensitive() {
        let detector = Detector::default();
        let verdict = detector.classify(Some(200), &no_headers(), "ROOT:X:0:0:root:/root:/bin/bash");
        assert!(verdict.vulnerable);
    }

    #[test]
    fn test_blocked_status_alone_flags_waf() {
        let detector = Detector::default();
        for status in [403, 406, 501] {
            let verdict = detector.classify(Some(status), &no_headers(), "");
            assert!(!verdict.vulnerable);
            assert!(verdict.waf_detected, "status {} should flag WAF", status);
        }
    }

    #[test]
    fn test_waf_header_signature() {
        let detector = Detector::default();
        let headers = vec![("Server".to_string(), "Cloudflare".to_string())];
        let verdict = detector.classify(Some(200), &headers, "welcome");
        assert!(verdict.waf_detected);
    }

    #[test]
    fn test_waf_body_signature() {
        let detector = Detector::default();
        let verdict = detector.classify(Some(200), &no_headers(), "Access Denied by policy");
        assert!(verdict.waf_detected);
    }

    #[test]
    fn test_absent_status_never_flags() {
        let detector = Detector::default();
        let verdict = detector.classify(None, &no_headers(), "");
        assert_eq!(verdict, Classification::default());
    }

    #[test]
    fn test_vulnerable_and_blocked_can_coexist() {
        let detector = Detector::default();
        let verdict = detector.classify(Some(403), &no_headers(), "root:x:0:0");
        assert!(verdict.vulnerable);
        assert!(verdict.waf_detected);
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let detector = Detector::new(DetectionRules {
            lfi_indicators: vec!["SECRET_TOKEN".to_string()],
            waf_indicators: vec![],
            blocked_status: vec![],
            candidate_params: vec![],
        });
        assert!(
            detector
                .classify(Some(200), &no_headers(), "secret_token=abc")
                .vulnerable
        );
        assert!(
            !detector
                .classify(Some(403), &no_headers(), "root:x:0:0")
                .waf_detected
        );
    }
}
