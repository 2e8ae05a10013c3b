use crate::{Error, Result};

/// Primary key of a relation.
///
/// Wraps the designated top-level column (all its leaves are marked
/// `in_primary_key`) and the ordered hierarchy path for composite keys:
/// ancestor relation names outermost first, ending with the owning relation.
/// The path is fixed at build time; there is no live reference back to a
/// parent key.
#[derive(Debug, Clone)]
pub struct KeyModel {
    pub(crate) field_name: String,
    /// Indices into the relation's flat leaf list.
    pub(crate) leaf_indices: Vec<usize>,
    /// Hierarchy segments, outermost ancestor first, self last.
    pub(crate) path: Vec<String>,
}

impl KeyModel {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn leaf_indices(&self) -> &[usize] {
        &self.leaf_indices
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Encodes one key value per hierarchy segment into the key string form.
    pub fn encode(&self, segments: &[&str]) -> Result<String> {
        if segments.len() != self.path.len() {
            return Err(Error::schema(
                self.path.last().map(String::as_str).unwrap_or_default(),
                format!(
                    "key for `{}` needs {} segment(s), got {}",
                    self.field_name,
                    self.path.len(),
                    segments.len()
                ),
            ));
        }
        Ok(encode_key(segments.iter().copied()))
    }
}

/// Joins key segments with `,`, percent-escaping the reserved characters:
/// `,` -> `%2C`, space -> `+`, `%` -> `%25`. A literal `+` escapes to `%2B`
/// so it stays distinct from an encoded space.
pub fn encode_key<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut first = true;
    for segment in segments {
        if !first {
            out.push(',');
        }
        first = false;
        escape_segment(&mut out, segment);
    }
    out
}

/// Exact inverse of [`encode_key`].
pub fn decode_key(text: &str) -> Vec<String> {
    text.split(',').map(unescape_segment).collect()
}

fn escape_segment(out: &mut String, segment: &str) {
    for c in segment.chars() {
        match c {
            ',' => out.push_str("%2C"),
            ' ' => out.push('+'),
            '+' => out.push_str("%2B"),
            '%' => out.push_str("%25"),
            _ => out.push(c),
        }
    }
}

fn unescape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '+' => out.push(' '),
            '%' => {
                let rest = chars.as_str();
                if let Some(code) = rest.get(..2) {
                    match code {
                        "2C" => {
                            out.push(',');
                            chars.next();
                            chars.next();
                        }
                        "2B" => {
                            out.push('+');
                            chars.next();
                            chars.next();
                        }
                        "25" => {
                            out.push('%');
                            chars.next();
                            chars.next();
                        }
                        _ => out.push('%'),
                    }
                } else {
                    out.push('%');
                }
            }
            _ => out.push(c),
        }
    }
    out
}
