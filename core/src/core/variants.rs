use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Number of encoding variants generated per payload.
pub const VARIANTS_PER_PAYLOAD: usize = 5;

/// Bytes percent-encoded when building payload variants: everything except
/// ASCII alphanumerics, `-_.~` and `/`. Slashes stay literal so the
/// slash-escaped variants remain distinct transforms.
const PAYLOAD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, PAYLOAD_ENCODE_SET).to_string()
}

/// Expands one raw payload into its encoding variants, in a fixed order:
/// raw, percent-encoded, double percent-encoded, slash-escaped (`/` → `%2f`),
/// and percent-encoded slash-escaped.
///
/// Always returns exactly [`VARIANTS_PER_PAYLOAD`] entries and the first is
/// the payload unmodified. Pure function; any input string is valid.
pub fn generate_variants(payload: &str) -> Vec<String> {
    let encoded = percent_encode(payload);
    let double_encoded = percent_encode(&encoded);
    let slashed = payload.replace('/', "%2f");
    let slashed_encoded = percent_encode(&slashed);

    vec![
        payload.to_string(),
        encoded,
        double_encoded,
        slashed,
        slashed_encoded,
    ]
}
