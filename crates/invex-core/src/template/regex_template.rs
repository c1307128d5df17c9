//! Built-in declarative template: regex field capture over prepared text.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{Template, TemplateOptions};
use crate::error::{ExtractError, TemplateError};
use crate::models::output::{ExtractionOutput, LineItem};

/// Fields every extraction must produce for the result to be usable
/// downstream (file renaming, output writers).
const REQUIRED_FIELDS: &[&str] = &["invoice_number", "date", "amount"];

/// Currency assumed when neither the document nor the template declares one.
const DEFAULT_CURRENCY: &str = "EUR";

/// Date formats tried after any template-declared ones.
const DEFAULT_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d.%m.%Y", "%d/%m/%y"];

/// Declarative template document, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    /// Issuer name stamped on every extraction from this template.
    pub issuer: String,

    /// Patterns that must all match for content-based selection.
    pub keywords: Vec<String>,

    /// Patterns that disqualify a document even when all keywords match.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    #[serde(default)]
    pub options: TemplateOptions,

    /// Per-field capture patterns. The first capture group is the value; a
    /// pattern without groups uses the whole match.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// Line-item table rules.
    #[serde(default)]
    pub lines: Option<LineRuleSpec>,
}

/// Declarative rules for locating and parsing the line-item table.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRuleSpec {
    /// Pattern marking the start of the table.
    pub start: String,

    /// Pattern marking the end of the table.
    pub end: String,

    /// Row pattern with named groups (`description`, `qty`, `rate`, `total`,
    /// `gst`).
    pub line: String,

    /// Rows to ignore inside the table region.
    #[serde(default)]
    pub skip_line: Option<String>,
}

/// A template with its patterns compiled, ready to match and extract.
#[derive(Debug)]
pub struct RegexTemplate {
    issuer: String,
    keywords: Vec<Regex>,
    exclude_keywords: Vec<Regex>,
    options: TemplateOptions,
    fields: BTreeMap<String, Regex>,
    lines: Option<LineRules>,
}

#[derive(Debug)]
struct LineRules {
    start: Regex,
    end: Regex,
    line: Regex,
    skip_line: Option<Regex>,
}

impl RegexTemplate {
    /// Compile a declarative spec into a usable template.
    pub fn compile(spec: TemplateSpec) -> Result<Self, TemplateError> {
        let keywords = compile_all("keywords", &spec.keywords)?;
        let exclude_keywords = compile_all("exclude_keywords", &spec.exclude_keywords)?;

        let mut fields = BTreeMap::new();
        for (name, pattern) in &spec.fields {
            fields.insert(name.clone(), compile_pattern(name, pattern)?);
        }

        let lines = match spec.lines {
            Some(rules) => Some(LineRules {
                start: compile_pattern("lines.start", &rules.start)?,
                end: compile_pattern("lines.end", &rules.end)?,
                line: compile_pattern("lines.line", &rules.line)?,
                skip_line: rules
                    .skip_line
                    .as_deref()
                    .map(|p| compile_pattern("lines.skip_line", p))
                    .transpose()?,
            }),
            None => None,
        };

        Ok(Self {
            issuer: spec.issuer,
            keywords,
            exclude_keywords,
            options: spec.options,
            fields,
            lines,
        })
    }

    /// Issuer this template extracts for.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn assign_field(
        &self,
        output: &mut ExtractionOutput,
        name: &str,
        value: String,
    ) -> Result<(), ExtractError> {
        match name {
            "issuer" => output.issuer = value,
            "amount" => output.amount = Some(parse_numeric("amount", &value)?),
            "date" => output.date = Some(self.parse_date(&value)?),
            "invoice_number" => output.invoice_number = Some(value),
            "currency" => output.currency = value,
            "desc" => output.desc = Some(value),
            "noofitem" => output.noofitem = Some(parse_numeric("noofitem", &value)?),
            // Raw digit string; the reconciler restores its decimal point.
            "totalqty" => output.totalqty = Some(value),
            other => debug!(field = other, "unrecognized field name, ignored"),
        }
        Ok(())
    }

    fn parse_date(&self, value: &str) -> Result<NaiveDate, ExtractError> {
        let formats = self
            .options
            .date_formats
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_DATE_FORMATS.iter().copied());
        for format in formats {
            if let Ok(date) = NaiveDate::parse_from_str(value.trim(), format) {
                return Ok(date);
            }
        }
        Err(ExtractError::Parse {
            field: "date".to_string(),
            value: value.to_string(),
        })
    }
}

impl Template for RegexTemplate {
    fn options(&self) -> &TemplateOptions {
        &self.options
    }

    fn prepare_input(&self, text: &str) -> String {
        let mut prepared = text.to_string();
        for (from, to) in &self.options.replace {
            prepared = prepared.replace(from.as_str(), to);
        }
        if self.options.lowercase {
            prepared = prepared.to_lowercase();
        }
        if self.options.remove_whitespace {
            prepared.retain(|c| !c.is_whitespace());
        }
        prepared
    }

    fn matches_input(&self, text: &str) -> bool {
        let all_keywords = self.keywords.iter().all(|k| k.is_match(text));
        if !all_keywords {
            return false;
        }
        if self.exclude_keywords.iter().any(|k| k.is_match(text)) {
            debug!(issuer = %self.issuer, "keywords matched but an exclude keyword fired");
            return false;
        }
        true
    }

    fn extract(&self, text: &str) -> Result<ExtractionOutput, ExtractError> {
        let mut output = ExtractionOutput {
            issuer: self.issuer.clone(),
            currency: self
                .options
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            ..Default::default()
        };

        for (name, pattern) in &self.fields {
            match capture_first(pattern, text) {
                Some(value) => self.assign_field(&mut output, name, value)?,
                None => debug!(field = %name, "field pattern did not match"),
            }
        }

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| match *field {
                "invoice_number" => output.invoice_number.is_none(),
                "date" => output.date.is_none(),
                "amount" => output.amount.is_none(),
                _ => false,
            })
            .collect();
        if !missing.is_empty() {
            return Err(ExtractError::MissingField(missing.join(", ")));
        }

        if output.desc.is_none() {
            let number = output.invoice_number.as_deref().unwrap_or_default();
            output.desc = Some(format!("Invoice {} from {}", number, output.issuer));
        }

        if let Some(rules) = &self.lines {
            output.lines = rules.parse(text);
        }

        debug!(
            issuer = %output.issuer,
            lines = output.lines.len(),
            "template extraction complete"
        );
        Ok(output)
    }
}

impl LineRules {
    fn parse(&self, text: &str) -> Vec<LineItem> {
        let Some(start) = self.start.find(text) else {
            debug!("line table start marker not found");
            return Vec::new();
        };
        let body = &text[start.end()..];
        let body = match self.end.find(body) {
            Some(end) => &body[..end.start()],
            None => body,
        };

        let mut items = Vec::new();
        for row in body.lines() {
            let row = row.trim();
            if row.is_empty() {
                continue;
            }
            if self.skip_line.as_ref().is_some_and(|p| p.is_match(row)) {
                continue;
            }
            match self.line.captures(row) {
                Some(caps) => items.push(LineItem {
                    description: named(&caps, "description"),
                    qty: named(&caps, "qty"),
                    rate: named(&caps, "rate"),
                    total: named(&caps, "total"),
                    gst: named(&caps, "gst"),
                }),
                None => debug!(row, "row did not match the line pattern"),
            }
        }
        items
    }
}

fn named(caps: &regex::Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().trim().to_string())
}

fn capture_first(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| {
        caps.get(1)
            .unwrap_or_else(|| caps.get(0).unwrap())
            .as_str()
            .trim()
            .to_string()
    })
}

/// Parse a numeric capture, tolerating thousands separators and stray
/// whitespace.
fn parse_numeric(field: &str, value: &str) -> Result<Decimal, ExtractError> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| ExtractError::Parse {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn compile_pattern(field: &str, pattern: &str) -> Result<Regex, TemplateError> {
    Regex::new(pattern).map_err(|e| TemplateError::Pattern {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(field: &str, patterns: &[String]) -> Result<Vec<Regex>, TemplateError> {
    patterns.iter().map(|p| compile_pattern(field, p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECEIPT: &str = "\
Sai Khushi Foods
Invoice No: 2021/0412
Date: 03/04/2021
Items: 2
Total Qty: 3.00
--- items ---
rice bag 2.00 350.00 700.00 0.00
oil tin 1.00 120.00 120.00 0.00
--- end ---
Grand Total: 820.00
";

    fn template_spec() -> TemplateSpec {
        serde_json::from_value(serde_json::json!({
            "issuer": "Sai Khushi Foods",
            "keywords": ["Sai Khushi"],
            "exclude_keywords": ["CREDIT NOTE"],
            "options": {
                "tid": ["28551694"],
                "currency": "INR",
                "date_formats": ["%d/%m/%Y"],
                "decimal": {"qty": 2, "rate": 2, "total": 2, "totalqty": 2},
                "correction_priority": "qty"
            },
            "fields": {
                "invoice_number": "Invoice No: (\\S+)",
                "date": "Date: (\\S+)",
                "amount": "Grand Total: ([\\d.]+)",
                "noofitem": "Items: (\\d+)",
                "totalqty": "Total Qty: (\\S+)"
            },
            "lines": {
                "start": "--- items ---",
                "end": "--- end ---",
                "line": "(?P<description>.+?) (?P<qty>\\S+) (?P<rate>\\S+) (?P<total>\\S+) (?P<gst>\\S+)$"
            }
        }))
        .unwrap()
    }

    #[test]
    fn extracts_header_fields_and_lines() {
        let template = RegexTemplate::compile(template_spec()).unwrap();
        let prepared = template.prepare_input(RECEIPT);
        let output = template.extract(&prepared).unwrap();

        assert_eq!(output.issuer, "Sai Khushi Foods");
        assert_eq!(output.invoice_number.as_deref(), Some("2021/0412"));
        assert_eq!(
            output.date,
            NaiveDate::from_ymd_opt(2021, 4, 3)
        );
        assert_eq!(output.amount, Some(Decimal::from_str("820.00").unwrap()));
        assert_eq!(output.currency, "INR");
        assert_eq!(output.noofitem, Some(Decimal::from(2)));
        assert_eq!(output.totalqty.as_deref(), Some("3.00"));

        assert_eq!(output.lines.len(), 2);
        assert_eq!(output.lines[0].description.as_deref(), Some("rice bag"));
        assert_eq!(output.lines[0].qty.as_deref(), Some("2.00"));
        assert_eq!(output.lines[1].total.as_deref(), Some("120.00"));
    }

    #[test]
    fn keyword_match_and_exclusion() {
        let template = RegexTemplate::compile(template_spec()).unwrap();
        assert!(template.matches_input(RECEIPT));
        assert!(!template.matches_input("some other shop"));

        let excluded = format!("{RECEIPT}\nCREDIT NOTE");
        assert!(!template.matches_input(&excluded));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let template = RegexTemplate::compile(template_spec()).unwrap();
        let err = template.extract("Sai Khushi but nothing else").unwrap_err();
        assert!(matches!(err, ExtractError::MissingField(_)));
    }

    #[test]
    fn desc_is_synthesized_when_not_captured() {
        let template = RegexTemplate::compile(template_spec()).unwrap();
        let output = template.extract(RECEIPT).unwrap();
        assert_eq!(
            output.desc.as_deref(),
            Some("Invoice 2021/0412 from Sai Khushi Foods")
        );
    }

    #[test]
    fn replace_and_lowercase_preparation() {
        let mut spec = template_spec();
        spec.options.replace = vec![("Khushi".to_string(), "Kushi".to_string())];
        spec.options.lowercase = true;
        let template = RegexTemplate::compile(spec).unwrap();

        assert_eq!(template.prepare_input("Sai Khushi"), "sai kushi");
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let mut spec = template_spec();
        spec.keywords = vec!["(".to_string()];
        let err = RegexTemplate::compile(spec).unwrap_err();
        assert!(matches!(err, TemplateError::Pattern { .. }));
    }
}
