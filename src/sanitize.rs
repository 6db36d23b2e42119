//! Markup neutralization for extracted text.

/// Escapes `&`, `<`, `>`, `"` and `'` so the text can be inserted into a document
/// without introducing markup.
///
/// Not idempotent: sanitizing already escaped text escapes the entities again.
pub fn sanitize(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}
