//! Output writers for extracted invoice data.

use serde::Serialize;

use invex_core::ExtractionOutput;

/// Output format for extracted data.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of extracted invoices
    Json,
    /// CSV summary, one row per invoice
    Csv,
    /// XML document
    Xml,
}

/// Render extracted invoices in the requested format.
///
/// `date_format` applies to the CSV writer only; JSON and XML keep ISO dates.
pub fn render(
    outputs: &[ExtractionOutput],
    format: OutputFormat,
    date_format: &str,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outputs)?),
        OutputFormat::Csv => to_csv(outputs, date_format),
        OutputFormat::Xml => to_xml(outputs),
    }
}

fn to_csv(outputs: &[ExtractionOutput], date_format: &str) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "issuer",
        "invoice_number",
        "date",
        "amount",
        "currency",
        "desc",
        "noofitem",
        "totalqty",
        "lines",
    ])?;

    for output in outputs {
        writer.write_record(&[
            output.issuer.clone(),
            output.invoice_number.clone().unwrap_or_default(),
            output
                .date
                .map(|d| d.format(date_format).to_string())
                .unwrap_or_default(),
            output.amount.map(|a| a.to_string()).unwrap_or_default(),
            output.currency.clone(),
            output.desc.clone().unwrap_or_default(),
            output.noofitem.map(|n| n.to_string()).unwrap_or_default(),
            output.totalqty.clone().unwrap_or_default(),
            output.lines.len().to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV output: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Serialize)]
struct InvoiceList<'a> {
    invoice: &'a [ExtractionOutput],
}

fn to_xml(outputs: &[ExtractionOutput]) -> anyhow::Result<String> {
    let document =
        quick_xml::se::to_string_with_root("invoices", &InvoiceList { invoice: outputs })?;
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{document}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sample() -> ExtractionOutput {
        ExtractionOutput {
            issuer: "Vendor".to_string(),
            amount: Some(Decimal::new(82000, 2)),
            date: NaiveDate::from_ymd_opt(2021, 4, 3),
            invoice_number: Some("2021/0412".to_string()),
            currency: "INR".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn json_renders_an_array() {
        let rendered = render(&[sample()], OutputFormat::Json, "%Y-%m-%d").unwrap();
        assert!(rendered.trim_start().starts_with('['));
        assert!(rendered.contains("\"issuer\": \"Vendor\""));
    }

    #[test]
    fn csv_honors_the_date_format() {
        let rendered = render(&[sample()], OutputFormat::Csv, "%d.%m.%Y").unwrap();
        assert!(rendered.contains("03.04.2021"));
        assert!(rendered.starts_with("issuer,invoice_number,date"));
    }

    #[test]
    fn xml_has_a_root_element() {
        let rendered = render(&[sample()], OutputFormat::Xml, "%Y-%m-%d").unwrap();
        assert!(rendered.contains("<invoices>"));
        assert!(rendered.contains("Vendor"));
    }
}
