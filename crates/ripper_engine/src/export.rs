use std::path::PathBuf;

use ripper_logging::ripper_info;

use crate::delivery::{DeliveryError, FileDelivery};

const FILENAME_PREFIX: &str = "pageripper";
const FILENAME_EXTENSION: &str = ".csv";

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Quote links containing `,`, `"` or line breaks. Off by default: links are
    /// written verbatim, one per line.
    pub quote_fields: bool,
}

/// CSV artifact ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkExport {
    /// `pageripper{target}.csv`, not escaped. Delivery makes it filesystem-safe.
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub link_count: usize,
    pub path: PathBuf,
}

/// Builds the download for `links`: one link per line, no header, no trailing newline.
pub fn build_link_export<I, S>(target: &str, links: I, options: &ExportOptions) -> LinkExport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<String> = links
        .into_iter()
        .map(|link| {
            let link = link.as_ref();
            if options.quote_fields {
                quote_field(link)
            } else {
                link.to_string()
            }
        })
        .collect();

    LinkExport {
        filename: format!("{FILENAME_PREFIX}{target}{FILENAME_EXTENSION}"),
        content: lines.join("\n"),
    }
}

/// Builds the export and hands it to `delivery`. Exactly one file per call.
pub fn export_links(
    target: &str,
    links: &[String],
    options: &ExportOptions,
    delivery: &dyn FileDelivery,
) -> Result<ExportSummary, DeliveryError> {
    let export = build_link_export(target, links, options);
    let path = delivery.deliver(&export)?;
    ripper_info!(
        "Exported {} links via {} to {:?}",
        links.len(),
        delivery.strategy(),
        path
    );
    Ok(ExportSummary {
        link_count: links.len(),
        path,
    })
}

/// RFC 4180 field quoting.
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
