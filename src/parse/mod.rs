pub mod capture;
pub mod marker;

pub use capture::{parse_capture, prune_checked, prune_checked_text, serialize_capture};
pub use marker::{LineSignal, annotation, decode_line, extract_id, parse_checkbox};
