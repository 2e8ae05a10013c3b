pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn consume_while<'s>(input: &mut &'s str, mut predicate: impl FnMut(char) -> bool) -> &'s str {
    let len = input
        .char_indices()
        .find(|(_, c)| !predicate(*c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let result = &input[..len];
    *input = &input[len..];
    result
}

/// Converts a source field identifier to its storage form, lower case with
/// underscores at word boundaries (`firstName` -> `first_name`).
pub fn storage_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    let mut boundary = false;
    for c in field.chars() {
        if c.is_uppercase() {
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            boundary = false;
        } else {
            boundary = c.is_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}
