//! Template loading from a directory of JSON documents.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::regex_template::{RegexTemplate, TemplateSpec};
use crate::error::TemplateError;

/// Load every `*.json` template under `dir`, in sorted file-name order.
///
/// Selection is first-match, so load order is part of the observable
/// behavior; sorting keeps it stable across platforms and runs.
pub fn load_templates(dir: &Path) -> Result<Vec<RegexTemplate>, TemplateError> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path)?;
        let spec: TemplateSpec =
            serde_json::from_str(&content).map_err(|e| TemplateError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), issuer = %spec.issuer, "loaded template");
        templates.push(RegexTemplate::compile(spec)?);
    }

    info!(count = templates.len(), dir = %dir.display(), "templates loaded");
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_template(dir: &Path, name: &str, issuer: &str) {
        let body = serde_json::json!({
            "issuer": issuer,
            "keywords": [issuer],
            "fields": {}
        });
        fs::write(dir.join(name), body.to_string()).unwrap();
    }

    #[test]
    fn loads_in_sorted_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "b_second.json", "Second Vendor");
        write_template(dir.path(), "a_first.json", "First Vendor");
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let templates = load_templates(dir.path()).unwrap();
        let issuers: Vec<&str> = templates.iter().map(|t| t.issuer()).collect();
        assert_eq!(issuers, vec!["First Vendor", "Second Vendor"]);
    }

    #[test]
    fn malformed_template_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let err = load_templates(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }
}
