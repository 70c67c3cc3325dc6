//! Normalization passes applied after parsing: slash collapsing, dot-segment
//! cleanup (handled by the `url` crate's own parser), percent-encoding
//! canonicalization, and stable query-parameter sorting.

use url::Url;

pub(crate) fn apply(url: &mut Url) {
    let collapsed = collapse_repeated_slashes(url.path());
    let canonical_path = canonicalize_percent_encoding(&collapsed);
    url.set_path(&canonical_path);

    if let Some(query) = url.query() {
        let sorted = sort_query(query);
        url.set_query(Some(&sorted));
    }
}

/// Collapse runs of `/` into a single `/`. `url`'s own parser already
/// resolves `.`/`..` segments without escaping the root, so only slash
/// collapsing remains here.
fn collapse_repeated_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_was_slash {
                continue;
            }
            prev_was_slash = true;
        } else {
            prev_was_slash = false;
        }
        out.push(c);
    }
    out
}

/// Decode over-encoded unreserved characters (`%XX` where the decoded byte
/// is ALPHA / DIGIT / `-` / `.` / `_` / `~`) and uppercase the hex digits of
/// any percent-encoding that remains. Operates byte-wise: percent-encoded
/// strings coming out of `url`'s parser are always ASCII, so this is safe.
fn canonicalize_percent_encoding(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(decoded) = u8::from_str_radix(hex, 16) {
                    let is_unreserved =
                        decoded.is_ascii_alphanumeric() || matches!(decoded, b'-' | b'.' | b'_' | b'~');
                    if is_unreserved {
                        out.push(decoded as char);
                    } else {
                        out.push('%');
                        out.push_str(&hex.to_ascii_uppercase());
                    }
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Stable sort by key then value; true duplicates (same key, same value)
/// keep their relative insertion order because the sort is stable.
fn sort_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.cmp(b));

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
