//! Name normalization helpers.

/// camelCase / PascalCase -> snake_case, lower-cased.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or digit, and before the last capital of an acronym run
/// when a lowercase letter follows (`HTTPCode` -> `http_code`).
pub fn to_snake_lower(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Lower-case and replace every char outside `[a-z0-9_:]` with `_`.
pub fn sanitize_metric_name(s: &str) -> String {
    s.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lower-case, replace every char outside `[a-z0-9_]` with `_` and prefix
/// `_` when the result would start with a digit.
pub fn sanitize_label_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    for c in s.chars() {
        let c = c.to_ascii_lowercase();
        if out.is_empty() && c.is_ascii_digit() {
            out.push('_');
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

/// Case-insensitive membership test.
pub fn contains_ignore_case(list: &[impl AsRef<str>], name: &str) -> bool {
    list.iter().any(|s| s.as_ref().eq_ignore_ascii_case(name))
}
