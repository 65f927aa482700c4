//! CSV export of the expired products report.

use thiserror::Error;

use crate::expired::ExpiredEntry;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV processing error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("exported report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub const HEADER: [&str; 8] = [
    "Produto",
    "Quantidade",
    "Data de Validade",
    "Ciclo",
    "Referência",
    "Ação Tomada",
    "Motivo",
    "Valor Original",
];

/// One row per entry, in the order given.
pub fn export_csv(entries: &[ExpiredEntry]) -> Result<String, ReportError> {
    let mut wtr = ::csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for e in entries {
        wtr.write_record([
            e.product.clone(),
            format!("{} {}", e.quantity, e.unit),
            e.expiry_date.format("%d/%m/%Y").to_string(),
            e.cadence.label().to_string(),
            e.cycle_ref.clone(),
            e.action.label().to_string(),
            e.reason.clone(),
            e.original_value.to_brl(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    tracing::debug!(rows = entries.len(), "expired products exported");
    Ok(String::from_utf8(bytes)?)
}
