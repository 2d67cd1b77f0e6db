/// Names that describe a state, not a place or tool
pub const RESERVED_CONTEXTS: [&str; 2] = ["waiting", "waiting_for"];

/// Context that can never be dropped
pub const DEFAULT_CONTEXT: &str = "inbox";

/// Context prefix that routes active actions into the agenda view
pub const AGENDA_PREFIX: &str = "agenda_";

/// Error type for context list edits
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context name cannot be empty")]
    Empty,
    #[error("'{0}' is a state, not a context")]
    Reserved(String),
    #[error("context not found: {0}")]
    NotFound(String),
    #[error("refusing to drop 'inbox'")]
    Protected,
}

/// Normalize a context name: trim, drop a leading `@`, lowercase, and join
/// words with `_`.
pub fn normalize_context(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('@').unwrap_or(s);
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_CONTEXTS.contains(&name)
}

/// Normalize, dedupe and sort a context list, removing empty and reserved
/// names.
pub fn clean_contexts(contexts: &[String]) -> Vec<String> {
    let mut out: Vec<String> = contexts
        .iter()
        .map(|c| normalize_context(c))
        .filter(|c| !c.is_empty() && !is_reserved(c))
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Add a context. Returns the normalized name and whether it was new.
pub fn add_context(contexts: &mut Vec<String>, raw: &str) -> Result<(String, bool), ContextError> {
    let name = normalize_context(raw);
    if name.is_empty() {
        return Err(ContextError::Empty);
    }
    if is_reserved(&name) {
        return Err(ContextError::Reserved(name));
    }
    let mut cleaned = clean_contexts(contexts);
    if cleaned.contains(&name) {
        *contexts = cleaned;
        return Ok((name, false));
    }
    cleaned.push(name.clone());
    cleaned.sort();
    *contexts = cleaned;
    Ok((name, true))
}

/// Drop a context. `inbox` is protected.
pub fn drop_context(contexts: &mut Vec<String>, raw: &str) -> Result<String, ContextError> {
    let name = normalize_context(raw);
    let mut cleaned = clean_contexts(contexts);
    if !cleaned.contains(&name) {
        return Err(ContextError::NotFound(name));
    }
    if name == DEFAULT_CONTEXT {
        return Err(ContextError::Protected);
    }
    cleaned.retain(|c| *c != name);
    *contexts = cleaned;
    Ok(name)
}

/// The agenda group for a context, e.g. `agenda_bob` -> `bob`.
pub fn agenda_name(context: &str) -> Option<&str> {
    context
        .strip_prefix(AGENDA_PREFIX)
        .filter(|rest| !rest.is_empty())
}
