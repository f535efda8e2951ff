//! CSV encoding of the output tables and the input template.
//!
//! Files are UTF-8 with a byte-order mark so spreadsheet apps and the ad
//! platform's importer read accented text correctly.

use crate::error::{PipelineError, PipelineResult};
use crate::models::columns::*;
use crate::models::{output_columns, INHERITED_COLUMNS};
use crate::transform::assembler::{ErrorTable, MappedTable};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().from_writer(UTF8_BOM.to_vec())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> PipelineResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| PipelineError::Export(e.to_string()))
}

fn export_err(err: csv::Error) -> PipelineError {
    PipelineError::Export(err.to_string())
}

/// Mapped table as bulk-import CSV.
pub fn mapped_table_to_csv(table: &MappedTable) -> PipelineResult<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(&table.columns).map_err(export_err)?;
    for row in &table.rows {
        wtr.write_record(row).map_err(export_err)?;
    }
    finish(wtr)
}

/// Error table as CSV (`row,field,error`).
pub fn error_table_to_csv(errors: &ErrorTable) -> PipelineResult<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(ErrorTable::COLUMNS).map_err(export_err)?;
    for err in errors.iter() {
        let row = err.row.to_string();
        wtr.write_record([row.as_str(), err.field.as_str(), err.error.as_str()])
            .map_err(export_err)?;
    }
    finish(wtr)
}

/// Input columns of the simple-mode sheet, in template order.
pub fn input_columns() -> Vec<&'static str> {
    std::iter::once(INPUT_LEVEL)
        .chain(output_columns().filter(|c| *c != ADVANTAGE_PLACEMENTS))
        .collect()
}

/// Blank simple-mode sheet with one example campaign and one example adset.
pub fn input_template_csv() -> PipelineResult<Vec<u8>> {
    let columns = input_columns();

    let campaign: &[(&str, &str)] = &[
        (INPUT_LEVEL, "campaign"),
        (CAMPAIGN_NAME, "Spring Leads"),
        (CAMPAIGN_STATUS, "PAUSED"),
        (CAMPAIGN_OBJECTIVE, "Leads"),
        (BUYING_TYPE, "AUCTION"),
        (CAMPAIGN_BID_STRATEGY, "Lowest cost"),
        (CAMPAIGN_DAILY_BUDGET, "100"),
        (CAMPAIGN_START_TIME, "2024-05-01 09:00"),
    ];
    let adset: &[(&str, &str)] = &[
        (INPUT_LEVEL, "adset"),
        (AD_SET_NAME, "Spring Leads - 25-45"),
        (COUNTRIES, "US"),
        (AGE_MIN, "25"),
        (AGE_MAX, "45"),
        (GENDER, "All"),
        (AD_NAME, "Spring Leads - Hero"),
        (TITLE, "Get your free quote"),
        (BODY, "Sign up in two minutes."),
        (LINK, "https://example.com/quote"),
        (IMAGE_FILE_NAME, "hero.jpg"),
    ];

    let mut wtr = writer();
    wtr.write_record(&columns).map_err(export_err)?;
    for example in [campaign, adset] {
        let record: Vec<&str> = columns
            .iter()
            .map(|col| {
                example
                    .iter()
                    .find(|(name, _)| name == col)
                    .map(|(_, value)| *value)
                    .unwrap_or("")
            })
            .collect();
        wtr.write_record(&record).map_err(export_err)?;
    }
    debug_assert!(INHERITED_COLUMNS.iter().all(|c| columns.contains(c)));
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorRecord;
    use crate::parser::parse_bytes_auto;
    use crate::transform::{transform, MappingProfile};

    #[test]
    fn test_mapped_csv_has_bom_and_header() {
        let bytes = mapped_table_to_csv(&MappedTable::empty()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.starts_with("Campaign Name,Campaign Status,"));
        assert!(text.trim_end().ends_with("Image File Name"));
    }

    #[test]
    fn test_error_csv() {
        let errors = ErrorTable {
            errors: vec![ErrorRecord::new(3, "adset", "Gender: 'x' invalid")],
        };
        let bytes = error_table_to_csv(&errors).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "row,field,error\n3,adset,Gender: 'x' invalid\n");
    }

    #[test]
    fn test_template_round_trips_through_transform() {
        let bytes = input_template_csv().unwrap();
        let parsed = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(parsed.headers.len(), input_columns().len());
        assert_eq!(parsed.rows.len(), 2);

        let output = transform(&parsed.rows, &MappingProfile::revised());
        assert!(output.is_clean(), "{:?}", output.errors);
        assert_eq!(output.mapped.len(), 2);
        assert_eq!(output.mapped.cell(1, CAMPAIGN_NAME), Some("Spring Leads"));
        assert_eq!(output.mapped.cell(1, CALL_TO_ACTION), Some("SIGN_UP"));
    }

    #[test]
    fn test_quoted_cells_survive_export() {
        let mut table = MappedTable::empty();
        let mut row = vec![String::new(); table.columns.len()];
        row[0] = "Spring, \"VIP\"".to_string();
        table.rows.push(row);

        let bytes = mapped_table_to_csv(&table).unwrap();
        let parsed = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(parsed.rows[0].get(CAMPAIGN_NAME), Some("Spring, \"VIP\""));
    }
}
