//! Text helpers for turning data keys and template names into display strings.

/// Turn a data key such as `user_name` into a display label (`User Name`).
///
/// Underscores become spaces, then every run of letters is capitalised with
/// the remainder lower-cased. Digits and punctuation end a word, so `abc2def`
/// becomes `Abc2Def`. Applying the function to its own output is a no-op.
pub fn format_key(key: &str) -> String {
    let mut formatted = String::with_capacity(key.len());
    let mut in_word = false;

    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                formatted.extend(ch.to_lowercase());
            } else {
                formatted.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            formatted.push(ch);
            in_word = false;
        }
    }

    formatted
}

/// Attachment file name for a generated document. Spaces, quotes, path
/// separators and control characters become underscores, so the name always
/// fits in a `Content-Disposition` header.
pub fn download_filename(template_name: &str, extension: &str) -> String {
    let stem: String = template_name
        .chars()
        .map(|ch| match ch {
            ' ' | '"' | '/' | '\\' => '_',
            ch if ch.is_control() => '_',
            other => other,
        })
        .collect();
    format!("{stem}.{extension}")
}
