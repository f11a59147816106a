use uuid::Uuid;

/// Reduces a client supplied filename to something safe to join onto the
/// upload directory: no path separators, no leading dots, ASCII only.
pub fn secure_filename(name: &str) -> String {
    let flattened: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Like [`secure_filename`], but never returns an empty name.
pub fn stored_filename(original: Option<&str>) -> String {
    match original.map(secure_filename) {
        Some(name) if !name.is_empty() => name,
        _ => Uuid::new_v4().simple().to_string(),
    }
}

/// Variant of an already sanitised `name` used when that name is taken:
/// `song.mp3` becomes `song-<uuid>.mp3`.
pub fn disambiguate(name: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], tag, &name[dot..]),
        _ => format!("{}-{}", name, tag),
    }
}

/// True when `name` can be served from the upload directory as-is.
pub fn is_safe(name: &str) -> bool {
    !name.is_empty() && secure_filename(name) == name
}
