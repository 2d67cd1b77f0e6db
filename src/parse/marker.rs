/// Literal that completes an item regardless of its checkbox
pub const FORCE_COMPLETE: &str = "XXX";

const BOM: char = '\u{feff}';
/// Start of an id annotation. Titles may not contain it.
pub const ANNOTATION_OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// What a single Markdown line says about completion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSignal {
    /// Entity id from the annotation, if the line is tracked
    pub id: Option<String>,
    /// Checked checkbox or force-complete marker present
    pub done: bool,
}

/// The annotation appended to every tracked line: `<!-- id:a_1234abcd -->`
pub fn annotation(id: &str) -> String {
    format!("{} id:{} {}", ANNOTATION_OPEN, id, CLOSE)
}

/// Decode a line into its id annotation and completion signal.
pub fn decode_line(line: &str) -> LineSignal {
    let line = line.strip_prefix(BOM).unwrap_or(line);
    let checked = parse_checkbox(line).unwrap_or(false);
    LineSignal {
        id: extract_id(line),
        done: checked || line.contains(FORCE_COMPLETE),
    }
}

/// Find the first well-formed `<!-- id:… -->` on the line.
///
/// Whitespace is allowed after `<!--` and before `-->`. The id may not
/// contain `>`. Escaped underscores (`\_`) are restored.
pub fn extract_id(line: &str) -> Option<String> {
    let mut rest = line;
    while let Some(pos) = rest.find(ANNOTATION_OPEN) {
        let after = &rest[pos + ANNOTATION_OPEN.len()..];
        if let Some(id) = id_after_open(after) {
            return Some(id);
        }
        rest = after;
    }
    None
}

fn id_after_open(s: &str) -> Option<String> {
    let body = s.trim_start().strip_prefix("id:")?;
    // The id runs up to the first `>`, which must close the comment.
    let gt = body.find('>')?;
    let raw = body[..gt].strip_suffix("--")?;
    let id = raw.trim().replace("\\_", "_");
    if id.is_empty() { None } else { Some(id) }
}

/// Parse a Markdown checkbox at the start of the line.
///
/// Accepts `-`, `*` or `+` bullets with optional indentation and spacing:
/// `- [ ]`, `* [x]`, `+[X]`. Returns `Some(true)` for a checked box,
/// `Some(false)` for an empty one, `None` if the line has no checkbox.
pub fn parse_checkbox(line: &str) -> Option<bool> {
    let line = line.strip_prefix(BOM).unwrap_or(line);
    let mut chars = line.trim_start().chars();
    if !matches!(chars.next()?, '-' | '*' | '+') {
        return None;
    }
    let mut chars = chars.as_str().trim_start().chars();
    if chars.next()? != '[' {
        return None;
    }
    let mark = chars.next()?;
    if chars.next()? != ']' {
        return None;
    }
    match mark {
        ' ' => Some(false),
        'x' | 'X' => Some(true),
        _ => None,
    }
}
