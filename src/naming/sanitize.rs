use crate::config::SeparatorPolicy;

/// Token joining the faces of a multi-face card name, e.g. "Fire // Ice".
pub const FACE_SEPARATOR: &str = " // ";

const ACCEPTED_PUNCTUATION: [char; 8] = ['-', '.', ';', ',', ':', '+', '\'', ' '];

/// Convert a card or set name into a valid base filename.
///
/// Trims the name, rewrites the face separator per `policy`, then drops every
/// character that is neither alphanumeric nor accepted punctuation.
pub fn sanitize(raw: &str, policy: SeparatorPolicy) -> String {
    let trimmed = raw.trim();
    let substituted = match policy {
        SeparatorPolicy::Join => trimmed.replace(FACE_SEPARATOR, "-+"),
        SeparatorPolicy::Delete => trimmed.replace(FACE_SEPARATOR, ""),
    };

    let filtered: String = substituted
        .chars()
        .filter(|c| is_accepted(*c))
        .collect();

    // removal can expose whitespace at the edges
    filtered.trim().to_string()
}

fn is_accepted(c: char) -> bool {
    c.is_alphanumeric() || ACCEPTED_PUNCTUATION.contains(&c)
}
