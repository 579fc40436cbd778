//! Smart replacements applied to typed text when the typography feature is
//! on.

/// Checked in order at every position, so longer patterns come first
const RULES: &[(&str, &str)] = &[
    ("(tm)", "™"),
    ("(c)", "©"),
    ("(r)", "®"),
    ("...", "…"),
    ("1/2", "½"),
    ("1/4", "¼"),
    ("3/4", "¾"),
    ("--", "—"),
    ("->", "→"),
    ("<-", "←"),
    ("<<", "«"),
    (">>", "»"),
];

pub fn apply(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while !rest.is_empty() {
        for (pattern, replacement) in RULES {
            if let Some(tail) = rest.strip_prefix(pattern) {
                out.push_str(replacement);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}
