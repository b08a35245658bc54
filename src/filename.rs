/// Make `name` safe to use as a file name on every major platform and give
/// it a `.pdf` extension.
pub fn sanitize_filename(name: &str) -> String {
    let stem = name.trim();
    let stem = stem
        .strip_suffix(".pdf")
        .or_else(|| stem.strip_suffix(".PDF"))
        .unwrap_or(stem);

    let mut out = String::with_capacity(stem.len());
    let mut last_was_sep = false;
    for ch in stem.chars() {
        let bad = matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            || ch.is_control()
            || ch.is_whitespace();
        if bad {
            if !last_was_sep && !out.is_empty() {
                out.push('_');
            }
            last_was_sep = true;
        } else {
            out.push(ch);
            last_was_sep = false;
        }
    }
    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let stem = if trimmed.is_empty() { "document" } else { trimmed };
    format!("{stem}.pdf")
}

/// Join non-empty parts (document type, subject name, date, ...) into one
/// sanitized file name, e.g. `["consent", "Jane Doe", "2024-05-01"]` →
/// `consent_Jane_Doe_2024-05-01.pdf`.
pub fn document_filename(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    sanitize_filename(&joined)
}
