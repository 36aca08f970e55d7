use std::path::Path;

/// Longest filename we echo back into logs
const MAX_LOGGED_NAME: usize = 255;

/// Lowercased extension of a client-supplied filename, without the dot.
///
/// Only the final path component is considered, so `../x/photo.JPG` yields
/// `jpg`. Dotfiles such as `.png` have no extension.
pub fn normalized_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");

    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Make a client-supplied filename safe to print.
///
/// Control characters and path separators are replaced and the result is
/// truncated on a char boundary.
pub fn display_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_control() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.len() > MAX_LOGGED_NAME {
        let mut end = MAX_LOGGED_NAME;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    }
}
