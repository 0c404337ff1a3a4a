use url::Url;

use crate::core::mutator::with_query_param;
use crate::core::variants::{generate_variants, VARIANTS_PER_PAYLOAD};
use crate::errors::ScanError;
use crate::utils::detector::DetectionRules;

/// A single request the probe engine will issue: the mutated URL plus the
/// parameter and payload variant it carries. Consumed exactly once.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub url: Url,
    pub param: String,
    pub variant: String,
}

/// Expands payloads into probe targets for `base_url`.
///
/// Parameter selection: an explicit `param` wins; otherwise the first
/// existing query parameter is mutated; a URL with no query string falls back
/// to discovery mode and tries every candidate name from `rules`.
///
/// The target count is exactly `payloads × VARIANTS_PER_PAYLOAD` per selected
/// parameter. Targets are deliberately not deduplicated: variants of a
/// payload made only of unreserved characters and slashes collide after query
/// re-encoding, and the probe sends them anyway so the report accounts for
/// every variant.
pub fn build_targets(
    base_url: &str,
    param: Option<&str>,
    payloads: &[String],
    rules: &DetectionRules,
) -> Result<Vec<ProbeTarget>, ScanError> {
    let url = Url::parse(base_url).map_err(|source| ScanError::MalformedUrl {
        url: base_url.to_string(),
        source,
    })?;

    let params: Vec<String> = if let Some(name) = param {
        vec![name.to_string()]
    } else if let Some((first, _)) = url.query_pairs().next() {
        vec![first.to_string()]
    } else {
        rules.candidate_params.clone()
    };

    let mut targets = Vec::with_capacity(params.len() * payloads.len() * VARIANTS_PER_PAYLOAD);
    for name in &params {
        for payload in payloads {
            for variant in generate_variants(payload) {
                let mutated = with_query_param(&url, name, &variant);
                targets.push(ProbeTarget {
                    url: mutated,
                    param: name.clone(),
                    variant,
                });
            }
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_count_is_payloads_times_variants() {
        let rules = DetectionRules::default();
        let targets = build_targets(
            "http://x.test/page.php?file=a",
            None,
            &payloads(&["../../etc/passwd", "/etc/hosts"]),
            &rules,
        )
        .unwrap();
        assert_eq!(targets.len(), 2 * VARIANTS_PER_PAYLOAD);
        assert!(targets.iter().all(|t| t.param == "file"));
    }

    #[test]
    fn test_explicit_param_wins() {
        let rules = DetectionRules::default();
        let targets = build_targets(
            "http://x.test/page.php?id=1&file=a",
            Some("file"),
            &payloads(&["p"]),
            &rules,
        )
        .unwrap();
        assert!(targets.iter().all(|t| t.param == "file"));
        // The untouched parameter is still on every mutated URL.
        assert!(targets.iter().all(|t| t.url.query().unwrap().contains("id=1")));
    }

    #[test]
    fn test_discovery_mode_multiplies_by_candidates() {
        let rules = DetectionRules::default();
        let targets = build_targets(
            "http://x.test/index.php",
            None,
            &payloads(&["../../etc/passwd"]),
            &rules,
        )
        .unwrap();
        assert_eq!(
            targets.len(),
            rules.candidate_params.len() * VARIANTS_PER_PAYLOAD
        );
        assert!(targets.iter().any(|t| t.param == "file"));
        assert!(targets.iter().any(|t| t.param == "page"));
    }

    #[test]
    fn test_variant_carried_matches_generation_order() {
        let rules = DetectionRules::default();
        let targets =
            build_targets("http://x.test/p?file=a", None, &payloads(&["a b/c"]), &rules).unwrap();
        let variants: Vec<&str> = targets.iter().map(|t| t.variant.as_str()).collect();
        assert_eq!(
            variants,
            vec!["a b/c", "a%20b/c", "a%2520b/c", "a b%2fc", "a%20b%252fc"]
        );
    }

    #[test]
    fn test_malformed_base_url_aborts() {
        let rules = DetectionRules::default();
        let err = build_targets("::::", None, &payloads(&["p"]), &rules).unwrap_err();
        assert!(matches!(err, ScanError::MalformedUrl { .. }));
    }
}
