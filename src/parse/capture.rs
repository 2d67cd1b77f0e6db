const BOM: char = '\u{feff}';

/// One top-level item of the capture document and the lines that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureItem {
    /// Whether the first line is a checked `- [x]` item
    pub checked: bool,
    /// The item line, its continuation lines and any blank lines after it
    pub lines: Vec<String>,
}

/// The parsed capture document (`inbox/inbox.md`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureDoc {
    /// Lines before the first item (e.g., `# Inbox`)
    pub header_lines: Vec<String>,
    pub items: Vec<CaptureItem>,
}

/// A line that starts a new item block: a top-level `- [` item, or a bare
/// `- [ ]` at any indentation.
fn starts_item(line: &str) -> bool {
    let s = line.trim_start_matches(BOM);
    s.starts_with("- [") || line.trim() == "- [ ]"
}

fn is_checked(line: &str) -> bool {
    let s = line.trim_start_matches(BOM);
    s.starts_with("- [x]") || s.starts_with("- [X]")
}

/// Split a capture document into header lines and item blocks.
///
/// The document carries no ids; it is structural only.
pub fn parse_capture(source: &str) -> CaptureDoc {
    let mut doc = CaptureDoc::default();

    for line in source.lines() {
        if starts_item(line) {
            doc.items.push(CaptureItem {
                checked: is_checked(line),
                lines: vec![line.to_string()],
            });
        } else if let Some(item) = doc.items.last_mut() {
            item.lines.push(line.to_string());
        } else {
            doc.header_lines.push(line.to_string());
        }
    }

    doc
}

/// Serialize the document, right-trimmed and ending in a single newline.
pub fn serialize_capture(doc: &CaptureDoc) -> String {
    let mut lines: Vec<&str> = doc.header_lines.iter().map(String::as_str).collect();
    for item in &doc.items {
        lines.extend(item.lines.iter().map(String::as_str));
    }
    let mut out = lines.join("\n").trim_end().to_string();
    out.push('\n');
    out
}

/// Remove every checked item block. Returns how many were removed.
pub fn prune_checked(doc: &mut CaptureDoc) -> usize {
    let before = doc.items.len();
    doc.items.retain(|item| !item.checked);
    before - doc.items.len()
}

/// Prune checked items from capture text. Returns the new text and the
/// number of items removed.
pub fn prune_checked_text(source: &str) -> (String, usize) {
    let mut doc = parse_capture(source);
    let removed = prune_checked(&mut doc);
    (serialize_capture(&doc), removed)
}
