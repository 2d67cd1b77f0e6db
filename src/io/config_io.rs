use std::fs;
use std::path::Path;

use crate::io::recovery::atomic_write;
use crate::io::workspace_io::WorkspaceError;
use crate::model::config::GtdConfig;

/// Read config.toml, returning both the parsed config and the raw toml_edit
/// document for round-trip-safe editing. A missing file yields the default
/// config and an empty document.
pub fn read_config(path: &Path) -> Result<(GtdConfig, toml_edit::DocumentMut), WorkspaceError> {
    if !path.exists() {
        log::debug!("{} missing, using default config", path.display());
        return Ok((GtdConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: GtdConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    atomic_write(path, doc.to_string().as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Replace the top-level `contexts` array, keeping the decoration of the
/// existing key.
pub fn set_contexts(doc: &mut toml_edit::DocumentMut, contexts: &[String]) {
    let array: toml_edit::Array = contexts.iter().map(String::as_str).collect();
    match doc.get_mut("contexts").and_then(|item| item.as_value_mut()) {
        Some(value) => {
            let decor = value.decor().clone();
            *value = toml_edit::Value::Array(array);
            *value.decor_mut() = decor;
        }
        None => {
            doc["contexts"] = toml_edit::value(array);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# My contexts
contexts = ["home", "phone"]

[sync]
# ask about stalled projects
prompt_next = false
"#
    }

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let (cfg, doc) = read_config(&tmp.path().join("config.toml")).unwrap();
        assert!(cfg.contexts.is_empty());
        assert!(cfg.sync.prompt_next);
        assert!(doc.is_empty());
    }

    #[test]
    fn set_contexts_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, sample_config()).unwrap();

        let (cfg, mut doc) = read_config(&path).unwrap();
        assert!(!cfg.sync.prompt_next);
        set_contexts(&mut doc, &["errands".into(), "home".into(), "phone".into()]);
        write_config(&path, &doc).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            r#"# My contexts
contexts = ["errands", "home", "phone"]

[sync]
# ask about stalled projects
prompt_next = false
"#
        );
    }

    #[test]
    fn set_contexts_on_empty_doc() {
        let mut doc = toml_edit::DocumentMut::new();
        set_contexts(&mut doc, &["home".into()]);
        let cfg: GtdConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(cfg.contexts, vec!["home"]);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "contexts = [").unwrap();
        assert!(matches!(
            read_config(&path),
            Err(WorkspaceError::ConfigParseError(_))
        ));
    }
}
