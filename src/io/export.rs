use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::domain::{Ledger, Pesos, Transaction};

/// Account statement written by the JSON export
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub commission_basis_points: u32,
    pub balance: Pesos,
    /// Oldest first
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Exporter for writing a ledger's history as a statement
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Write in the given format and return the number of transactions written
    pub fn export<W: Write>(&self, format: ExportFormat, writer: W) -> Result<usize> {
        match format {
            ExportFormat::Csv => self.export_csv(writer),
            ExportFormat::Json => Ok(self.export_json(writer)?.transactions.len()),
        }
    }

    /// Export transactions to CSV format, oldest first
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "kind",
            "timestamp",
            "amount",
            "fee",
            "total_debit",
        ])?;

        let mut count = 0;
        for tx in self.ledger.history() {
            csv_writer.write_record(&[
                tx.id().to_string(),
                tx.kind().as_str().to_string(),
                tx.timestamp().to_rfc3339(),
                tx.amount().to_string(),
                tx.fee().to_string(),
                tx.total_debit().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full statement as pretty JSON
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<Statement> {
        let statement = Statement {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            commission_basis_points: self.ledger.commission().basis_points(),
            balance: self.ledger.current_balance(),
            transactions: self.ledger.history().to_vec(),
        };

        let json = serde_json::to_string_pretty(&statement)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::CommissionRate;

    fn sample_ledger() -> Ledger {
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ledger = Ledger::opened_with(500000, opened, CommissionRate::default()).unwrap();
        ledger
            .withdraw_at(100000, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
            .unwrap();
        ledger
    }

    #[test]
    fn test_export_csv_rows() {
        let ledger = sample_ledger();
        let mut out = Vec::new();

        let count = Exporter::new(&ledger).export_csv(&mut out).unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,kind,timestamp,amount,fee,total_debit");
        assert_eq!(lines[1], "1,deposit,2024-01-01T00:00:00+00:00,500000,0,0");
        assert_eq!(
            lines[2],
            "2,withdrawal,2024-01-02T00:00:00+00:00,100000,10000,110000"
        );
    }

    #[test]
    fn test_export_json_statement() {
        let ledger = sample_ledger();
        let mut out = Vec::new();

        let statement = Exporter::new(&ledger).export_json(&mut out).unwrap();

        assert_eq!(statement.balance, 390000);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["balance"], 390000);
        assert_eq!(value["commission_basis_points"], 1000);
        assert_eq!(value["transactions"].as_array().unwrap().len(), 2);
        assert_eq!(value["transactions"][1]["kind"], "withdrawal");
    }

    #[test]
    fn test_format_from_str() {
        for format in [ExportFormat::Csv, ExportFormat::Json] {
            assert_eq!(ExportFormat::from_str(format.as_str()), Some(format));
        }
        assert_eq!(ExportFormat::from_str("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_str("xml"), None);
    }
}
