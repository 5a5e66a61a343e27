//! Tabular output in table, JSON, CSV and TSV form.
//!
//! Commands turn their records into rows of strings under fixed column
//! headers; this module renders them. Empty cells print as `-` in tables
//! and as `null` in JSON.

use std::io::Write;

use clap::ValueEnum;
use labres::config::OutputFormat as ConfigFormat;

use crate::error::CliError;

/// Output format for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated values)
    Tsv,
}

impl OutputFormat {
    /// Picks the flag value, then the configured format, then `table`.
    pub fn resolve(flag: Option<Self>, configured: Option<ConfigFormat>) -> Self {
        flag.or_else(|| configured.map(Self::from))
            .unwrap_or(Self::Table)
    }
}

impl From<ConfigFormat> for OutputFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Json => Self::Json,
            ConfigFormat::Csv => Self::Csv,
            ConfigFormat::Tsv => Self::Tsv,
            ConfigFormat::Table => Self::Table,
        }
    }
}

/// Rows under fixed column headers.
#[derive(Debug, Clone)]
pub struct Rows {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Rows {
    pub fn new(headers: &'static [&'static str]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row; it must have one cell per header.
    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Renders every row to `out`.
    pub fn write(&self, format: OutputFormat, out: &mut impl Write) -> Result<(), CliError> {
        match format {
            OutputFormat::Table => self.write_table(out),
            OutputFormat::Json => self.write_json(out),
            OutputFormat::Csv => self.write_delimited(out, b','),
            OutputFormat::Tsv => self.write_delimited(out, b'\t'),
        }
    }

    /// Renders every row to stdout.
    pub fn print(&self, format: OutputFormat) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write(format, &mut handle)
    }

    fn write_table(&self, out: &mut impl Write) -> Result<(), CliError> {
        let header_line = self
            .headers
            .iter()
            .map(|s| s.to_uppercase())
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(out, "{header_line}")?;

        for row in &self.rows {
            let line = row
                .iter()
                .map(|cell| if cell.is_empty() { "-" } else { cell.as_str() })
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn write_json(&self, out: &mut impl Write) -> Result<(), CliError> {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| {
                        let value = if cell.is_empty() {
                            serde_json::Value::Null
                        } else {
                            serde_json::Value::String(cell.clone())
                        };
                        ((*header).to_string(), value)
                    })
                    .collect()
            })
            .collect();

        serde_json::to_writer_pretty(&mut *out, &objects)?;
        writeln!(out)?;
        Ok(())
    }

    fn write_delimited(&self, out: &mut impl Write, delimiter: u8) -> Result<(), CliError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(out);

        writer.write_record(self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
