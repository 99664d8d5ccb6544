//! The letter content model – everything the layout engine consumes,
//! already formatted as strings.
//!
//! This is the boundary to the business layer: amounts, tax breakdowns and
//! dates arrive pre-computed and pre-formatted; the engine only places
//! them. JSON field names are camelCase.

use serde::{Deserialize, Serialize};

use crate::canvas::CellAlign;
use crate::error::LayoutError;

/// A complete letter: the fixed DIN zones plus the flowing body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterContent {
    /// Logo placed in the header band, fitted to the zone height.
    #[serde(default)]
    pub logo: Option<Logo>,
    /// Small print above the receiver address ("Company - Street 1, 12345 City").
    #[serde(default)]
    pub sender_lines: Vec<String>,
    /// Receiver address block, one entry per line.
    pub receiver_lines: Vec<String>,
    /// Label/value pairs of the metadata block (customer number, date, …).
    #[serde(default)]
    pub meta: Vec<MetaEntry>,
    pub body: BodyContent,
    pub footer: FooterContent,
    /// Prepended to every page-number stamp (used by table attachments).
    #[serde(default)]
    pub page_number_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    /// `http(s)://` URL or `data:image/...;base64,...` URI.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaEntry {
    pub label: String,
    pub value: String,
}

/// The flowing part of the letter between the metadata block and the
/// footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyContent {
    /// Large bold heading, e.g. "Rechnung".
    pub headline: String,
    /// Reference appended to the headline, e.g. the invoice number.
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub opening: String,
    /// Small italic line between opening and table (service period etc.).
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub table: Option<TableContent>,
    /// Closing paragraphs, separated by blank lines.
    #[serde(default)]
    pub closing: Vec<String>,
}

/// A position table: header band, body rows, optional summary band.
/// Columns are sized as percentages of the printable width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    pub header: Vec<String>,
    pub column_percents: Vec<f32>,
    pub column_aligns: Vec<CellAlign>,
    pub rows: Vec<Vec<String>>,
    /// Label/value summary rows; the last one is the grand total.
    #[serde(default)]
    pub summary: Vec<SummaryRow>,
    /// Spacer/label/value column percentages of the summary band.
    #[serde(default = "default_summary_percents")]
    pub summary_percents: Vec<f32>,
}

fn default_summary_percents() -> Vec<f32> {
    vec![60.0, 25.0, 15.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Footer contact columns; each entry is one line. The tallest column
/// determines the footer band height.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default)]
    pub center: Vec<String>,
    #[serde(default)]
    pub right: Vec<String>,
}

impl FooterContent {
    /// Number of text lines the footer band needs.
    pub fn line_count(&self) -> usize {
        self.left.len().max(self.center.len()).max(self.right.len())
    }
}

impl LetterContent {
    /// Parse a letter from its JSON request representation.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(json)
            .map_err(|e| LayoutError::InvalidArgument(format!("letter content: {e}")))
    }
}
