const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

/// Four digit year as text, empty for anything else (the backend stores 0
/// for albums saved without a year).
pub fn format_year(year: i32) -> String {
    if (1000..=9999).contains(&year) {
        year.to_string()
    } else {
        String::new()
    }
}

/// Cuts `text` to `max` characters and appends `...` when it was longer.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Whether `url` is an http(s) url whose path ends in a known image extension.
pub fn is_image_url(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };

    // Drop query and fragment, then the host.
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let Some((host, path)) = rest.split_once('/') else {
        return false;
    };
    if host.is_empty() {
        return false;
    }

    let path = path.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
