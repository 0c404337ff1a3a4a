use url::Url;

use crate::errors::ScanError;

/// Parses `base` and sets `param` to `value` in its query string.
///
/// Fails with [`ScanError::MalformedUrl`] when the base URL does not parse.
pub fn set_query_param(base: &str, param: &str, value: &str) -> Result<Url, ScanError> {
    let url = Url::parse(base).map_err(|source| ScanError::MalformedUrl {
        url: base.to_string(),
        source,
    })?;
    Ok(with_query_param(&url, param, value))
}

/// Returns a copy of `url` with the query entry named `param` set to `value`.
///
/// Every other query entry keeps its decoded key/value and its original
/// relative order; a missing parameter is appended at the end. Values go
/// through the form-urlencoded serializer, so a variant that already carries
/// percent-escapes keeps them on the wire (`%` becomes `%25`, which is
/// exactly what the double-encoding bypasses rely on).
pub fn with_query_param(url: &Url, param: &str, value: &str) -> Url {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut replaced = false;
    for (k, v) in pairs.iter_mut() {
        if k == param {
            *v = value.to_string();
            replaced = true;
        }
    }
    if !replaced {
        pairs.push((param.to_string(), value.to_string()));
    }

    let mut mutated = url.clone();
    mutated.query_pairs_mut().clear();
    for (k, v) in &pairs {
        mutated.query_pairs_mut().append_pair(k, v);
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_existing_param() {
        let url = set_query_param("http://x.test/page.php?file=a", "file", "../../etc/passwd").unwrap();
        assert_eq!(url.query(), Some("file=..%2F..%2Fetc%2Fpasswd"));
    }

    #[test]
    fn test_other_params_keep_value_and_order() {
        let url = set_query_param(
            "http://x.test/page.php?id=7&file=a&lang=en",
            "file",
            "payload",
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), "7".to_string()),
                ("file".to_string(), "payload".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_param_is_appended() {
        let url = set_query_param("http://x.test/index.php?id=1", "file", "/etc/passwd").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("file".to_string(), "/etc/passwd".to_string()));
    }

    #[test]
    fn test_already_encoded_variant_survives() {
        // A pre-encoded variant must not be unwrapped: its escapes are part
        // of the payload, so the serializer escapes the percent signs.
        let url = set_query_param("http://x.test/page.php?file=a", "file", "..%2fetc").unwrap();
        assert_eq!(url.query(), Some("file=..%252fetc"));
    }

    #[test]
    fn test_malformed_base_url() {
        let err = set_query_param("not a url", "file", "x").unwrap_err();
        assert!(matches!(err, ScanError::MalformedUrl { .. }));
    }

    #[test]
    fn test_url_without_query() {
        let url = set_query_param("http://x.test/index.php", "page", "v").unwrap();
        assert_eq!(url.query(), Some("page=v"));
    }
}
