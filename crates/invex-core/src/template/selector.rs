//! Deterministic first-match template selection.

use tracing::{debug, info};

use super::Template;

/// Pick the first template whose identifier list contains `tid` exactly.
///
/// First match wins: the order of the template list is semantically
/// significant, and later templates are never consulted once one matches.
pub fn select_by_tid<'a>(
    templates: &'a [Box<dyn Template>],
    tid: &str,
) -> Option<&'a dyn Template> {
    for template in templates {
        if template.options().tid.iter().any(|candidate| candidate == tid) {
            info!(tid, "template selected by identifier");
            return Some(template.as_ref());
        }
    }
    debug!(tid, "no template carries this identifier");
    None
}

/// Pick the first template whose own match predicate accepts the text.
///
/// Each candidate prepares the raw text its own way before matching; the
/// prepared text of the winner is returned so the caller can extract without
/// preparing twice. First match wins here too.
pub fn select_by_content<'a>(
    templates: &'a [Box<dyn Template>],
    raw_text: &str,
) -> Option<(&'a dyn Template, String)> {
    for template in templates {
        let prepared = template.prepare_input(raw_text);
        if template.matches_input(&prepared) {
            info!("template selected by content match");
            return Some((template.as_ref(), prepared));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::models::output::ExtractionOutput;
    use crate::template::TemplateOptions;
    use pretty_assertions::assert_eq;

    struct FakeTemplate {
        options: TemplateOptions,
        keyword: &'static str,
    }

    impl FakeTemplate {
        fn with_tid(tid: &str, keyword: &'static str) -> Box<dyn Template> {
            Box::new(Self {
                options: TemplateOptions {
                    tid: vec![tid.to_string()],
                    ..Default::default()
                },
                keyword,
            })
        }
    }

    impl Template for FakeTemplate {
        fn options(&self) -> &TemplateOptions {
            &self.options
        }

        fn prepare_input(&self, text: &str) -> String {
            text.to_string()
        }

        fn matches_input(&self, text: &str) -> bool {
            text.contains(self.keyword)
        }

        fn extract(&self, _text: &str) -> Result<ExtractionOutput, ExtractError> {
            Ok(ExtractionOutput {
                issuer: self.keyword.to_string(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn tid_match_ignores_list_position() {
        let templates = vec![
            FakeTemplate::with_tid("A", "alpha"),
            FakeTemplate::with_tid("B", "beta"),
        ];

        let selected = select_by_tid(&templates, "B").unwrap();
        assert_eq!(selected.options().tid, vec!["B".to_string()]);
    }

    #[test]
    fn unknown_tid_selects_nothing() {
        let templates = vec![FakeTemplate::with_tid("A", "alpha")];
        assert!(select_by_tid(&templates, "Z").is_none());
    }

    #[test]
    fn content_selection_is_first_match() {
        // Both templates match the text; the earlier one must win.
        let templates = vec![
            FakeTemplate::with_tid("A", "invoice"),
            FakeTemplate::with_tid("B", "invoice"),
        ];

        let (selected, prepared) = select_by_content(&templates, "an invoice").unwrap();
        assert_eq!(selected.options().tid, vec!["A".to_string()]);
        assert_eq!(prepared, "an invoice");
    }

    #[test]
    fn no_content_match_selects_nothing() {
        let templates = vec![FakeTemplate::with_tid("A", "alpha")];
        assert!(select_by_content(&templates, "unrelated text").is_none());
    }
}
