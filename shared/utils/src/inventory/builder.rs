//! Material Record Builder
//!
//! Assembles `Material` records from interactively entered fields or from
//! uploaded CSV rows. Uniqueness and percent totals are not checked here.

use chrono::{DateTime, Utc};
use csv::StringRecord;
use inventory_models::{EntrySource, Material};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::validation::validate_model;

/// Interactive entries need at least this many CAS rows per material
pub const MIN_INTERACTIVE_CAS_ENTRIES: usize = 2;

/// Cell values the tabular reader treats as missing, besides blank cells
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const SDS_HEADERS: &[&str] = &["sds #", "sds#", "sds", "sds number", "sds_number"];
const NAME_HEADERS: &[&str] = &["material name", "material", "material_name", "name"];
const QUANTITY_HEADERS: &[&str] = &[
    "order quantity (lbs)",
    "order quantity",
    "order_quantity",
    "quantity (lbs)",
    "quantity",
];

/// Number of fixed leading columns before the CAS pairs start
pub const FIXED_COLUMNS: usize = 3;

pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
}

/// One material as typed into the entry form. Numeric fields stay raw text
/// until the builder parses them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MaterialEntry {
    #[serde(default)]
    pub sds_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "field_text")]
    pub order_quantity: String,
    #[serde(default)]
    pub cas_entries: Vec<CasEntryInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CasEntryInput {
    #[serde(default)]
    pub cas_number: String,
    #[serde(default, deserialize_with = "field_text")]
    pub percent: String,
}

/// Keep a numeric form field as text whatever JSON type it arrived as; null
/// becomes empty so the builder reports it as missing for that entry alone
fn field_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A built material with where it came from
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParsedMaterial {
    /// 1-based position in the submission
    pub position: usize,
    /// CSV line number (header is line 1)
    pub row_number: Option<usize>,
    pub material: Material,
}

/// An entry that could not be turned into a material
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedEntry {
    pub position: usize,
    pub row_number: Option<usize>,
    pub error: InventoryError,
}

/// Every entry of one submission, built or rejected
#[derive(Debug, Clone, Serialize)]
pub struct ParsedInventory {
    pub id: Uuid,
    pub source: EntrySource,
    pub received_at: DateTime<Utc>,
    pub materials: Vec<ParsedMaterial>,
    pub rejected: Vec<RejectedEntry>,
    pub warnings: Vec<String>,
    pub total_entries: usize,
}

impl ParsedInventory {
    fn new(source: EntrySource) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            received_at: Utc::now(),
            materials: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
            total_entries: 0,
        }
    }

    fn push(&mut self, position: usize, row_number: Option<usize>, result: InventoryResult<Material>) {
        self.total_entries += 1;
        match result {
            Ok(material) => self.materials.push(ParsedMaterial {
                position,
                row_number,
                material,
            }),
            Err(error) => {
                crate::log_warn!(error, position, row = ?row_number, "Entry rejected");
                self.rejected.push(RejectedEntry {
                    position,
                    row_number,
                    error,
                });
            }
        }
    }
}

/// One `(CAS #, % CAS #)` column pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasColumnGroup {
    pub cas_column: usize,
    pub percent_column: usize,
    pub cas_header: String,
    pub percent_header: String,
}

/// Column layout of an inventory CSV: three fixed columns followed by
/// repeating CAS/percent pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
    pub headers: Vec<String>,
    pub cas_groups: Vec<CasColumnGroup>,
}

impl CsvSchema {
    pub fn from_headers(headers: &StringRecord) -> InventoryResult<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        if headers.len() < FIXED_COLUMNS {
            return Err(InventoryError::csv_schema(format!(
                "Expected at least {} columns (SDS #, Material Name, Order Quantity (lbs)), found {}",
                FIXED_COLUMNS,
                headers.len()
            )));
        }

        let expected: [(&str, &[&str]); FIXED_COLUMNS] = [
            ("SDS #", SDS_HEADERS),
            ("Material Name", NAME_HEADERS),
            ("Order Quantity (lbs)", QUANTITY_HEADERS),
        ];
        for (index, (label, candidates)) in expected.iter().enumerate() {
            let header = headers[index].to_lowercase();
            if !candidates.contains(&header.as_str()) {
                return Err(InventoryError::csv_schema(format!(
                    "Column {} must be '{}', found '{}'",
                    index + 1,
                    label,
                    headers[index]
                )));
            }
        }

        let trailing = headers.len() - FIXED_COLUMNS;
        if trailing % 2 != 0 {
            return Err(InventoryError::csv_schema(format!(
                "CAS columns must come in (CAS #, % CAS #) pairs; found {} trailing columns",
                trailing
            )));
        }

        let cas_groups = (FIXED_COLUMNS..headers.len())
            .step_by(2)
            .map(|cas_column| CasColumnGroup {
                cas_column,
                percent_column: cas_column + 1,
                cas_header: headers[cas_column].clone(),
                percent_header: headers[cas_column + 1].clone(),
            })
            .collect();

        Ok(Self {
            headers,
            cas_groups,
        })
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Build one material from a data row. Pairs with a missing cell are skipped.
    pub fn build_material(&self, record: &StringRecord, row_number: usize) -> InventoryResult<Material> {
        let cell = |index: usize| record.get(index).filter(|value| !is_missing(value));

        let sds_number = cell(0).map(str::trim).unwrap_or_default();
        let name = cell(1).map(str::trim).unwrap_or_default();
        let order_quantity = parse_number(Some(row_number), &self.headers[2], cell(2))?;

        let mut material = Material::new(sds_number, name, order_quantity);
        for group in &self.cas_groups {
            match (cell(group.cas_column), cell(group.percent_column)) {
                (Some(cas_number), Some(percent)) => {
                    let percent = parse_number(Some(row_number), &group.percent_header, Some(percent))?;
                    material.add_cas_entry(cas_number.trim(), percent);
                }
                _ => debug!(row = row_number, column = group.cas_column, "Skipping incomplete CAS pair"),
            }
        }

        check_ranges(&material, Some(row_number))?;
        Ok(material)
    }
}

fn parse_number(row: Option<usize>, field: &str, raw: Option<&str>) -> InventoryResult<f64> {
    let raw = match raw {
        Some(raw) if !is_missing(raw) => raw.trim(),
        _ => {
            return Err(InventoryError::invalid_input(
                row,
                field,
                raw.unwrap_or_default(),
                "A numeric value is required",
            ))
        }
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InventoryError::invalid_input(row, field, raw, "Not a number")),
    }
}

/// Quantity and percent bounds, enforced through the model's validation rules
fn check_ranges(material: &Material, row: Option<usize>) -> InventoryResult<()> {
    validate_model(material).map_err(|error| match error {
        InventoryError::Validation { message, .. } => {
            InventoryError::invalid_input(row, "material", material.sds_number.clone(), message)
        }
        other => other,
    })
}

/// Builds materials for one submission
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder;

impl RecordBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build one interactively entered material (`index` is 0-based)
    pub fn build_entry(&self, index: usize, entry: &MaterialEntry) -> InventoryResult<Material> {
        if entry.cas_entries.len() < MIN_INTERACTIVE_CAS_ENTRIES {
            return Err(InventoryError::invalid_input(
                None,
                format!("materials[{}].cas_entries", index),
                entry.cas_entries.len().to_string(),
                format!(
                    "At least {} CAS numbers are required per material",
                    MIN_INTERACTIVE_CAS_ENTRIES
                ),
            ));
        }

        let order_quantity = parse_number(
            None,
            &format!("materials[{}].order_quantity", index),
            Some(entry.order_quantity.as_str()),
        )?;

        let mut material = Material::new(entry.sds_number.trim(), entry.name.trim(), order_quantity);
        for (j, cas) in entry.cas_entries.iter().enumerate() {
            let percent = parse_number(
                None,
                &format!("materials[{}].cas_entries[{}].percent", index, j),
                Some(cas.percent.as_str()),
            )?;
            material.add_cas_entry(cas.cas_number.trim(), percent);
        }

        check_ranges(&material, None)?;
        Ok(material)
    }

    pub fn build_entries(&self, entries: &[MaterialEntry]) -> ParsedInventory {
        let mut parsed = ParsedInventory::new(EntrySource::Interactive);
        for (index, entry) in entries.iter().enumerate() {
            parsed.push(index + 1, None, self.build_entry(index, entry));
        }
        parsed
    }

    /// Parse an uploaded CSV. Schema problems fail the whole file; row
    /// problems reject only that row.
    pub fn parse_csv(&self, data: &[u8]) -> InventoryResult<ParsedInventory> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let schema = CsvSchema::from_headers(reader.headers()?)?;
        debug!(cas_groups = schema.cas_groups.len(), "CSV schema accepted");

        let mut parsed = ParsedInventory::new(EntrySource::Csv);
        for (idx, result) in reader.records().enumerate() {
            let row_number = idx + 2;
            let built = result.map_err(InventoryError::from).and_then(|record| {
                if record.len() > schema.width() {
                    parsed.warnings.push(format!(
                        "Row {}: {} cells beyond the header were ignored",
                        row_number,
                        record.len() - schema.width()
                    ));
                }
                schema.build_material(&record, row_number)
            });
            parsed.push(idx + 1, Some(row_number), built);
        }

        Ok(parsed)
    }
}

/// Human-readable line for a rejected entry
pub fn describe_rejection(entry: &RejectedEntry) -> String {
    match &entry.error {
        InventoryError::InvalidInput { .. } => entry.error.to_string(),
        other => match entry.row_number {
            Some(row) => format!("Row {}: {}", row, other),
            None => format!("Material {}: {}", entry.position, other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(sds: &str, name: &str, qty: &str, cas: &[(&str, &str)]) -> MaterialEntry {
        MaterialEntry {
            sds_number: sds.to_string(),
            name: name.to_string(),
            order_quantity: qty.to_string(),
            cas_entries: cas
                .iter()
                .map(|(c, p)| CasEntryInput {
                    cas_number: c.to_string(),
                    percent: p.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_interactive_entry() {
        let builder = RecordBuilder::new();
        let material = builder
            .build_entry(0, &entry("S1", "Acetone", "200", &[("67-64-1", "60"), ("7732-18-5", "40")]))
            .unwrap();

        assert_eq!(material.sds_number, "S1");
        assert_eq!(material.order_quantity, 200.0);
        assert_eq!(material.composition.len(), 2);
        assert_eq!(material.composition[1].percent, 40.0);
    }

    #[test]
    fn test_interactive_entry_needs_two_cas_rows() {
        let builder = RecordBuilder::new();
        let err = builder
            .build_entry(0, &entry("S1", "Acetone", "200", &[("67-64-1", "100")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_interactive_entry_rejects_non_numeric_and_out_of_range() {
        let builder = RecordBuilder::new();

        let bad_qty = builder.build_entry(0, &entry("S1", "A", "lots", &[("1-11-1", "50"), ("2-22-2", "50")]));
        assert!(matches!(bad_qty, Err(InventoryError::InvalidInput { ref field, .. }) if field == "materials[0].order_quantity"));

        let negative = builder.build_entry(0, &entry("S1", "A", "-3", &[("1-11-1", "50"), ("2-22-2", "50")]));
        assert!(matches!(negative, Err(InventoryError::InvalidInput { .. })));

        let over = builder.build_entry(0, &entry("S1", "A", "10", &[("1-11-1", "150"), ("2-22-2", "50")]));
        assert!(matches!(over, Err(InventoryError::InvalidInput { .. })));

        let nan = builder.build_entry(0, &entry("S1", "A", "NaN", &[("1-11-1", "50"), ("2-22-2", "50")]));
        assert!(nan.is_err());
    }

    #[test]
    fn test_build_entries_keeps_going_after_rejection() {
        let builder = RecordBuilder::new();
        let parsed = builder.build_entries(&[
            entry("S1", "A", "x", &[("1-11-1", "50"), ("2-22-2", "50")]),
            entry("S2", "B", "10", &[("1-11-1", "50"), ("2-22-2", "50")]),
        ]);

        assert_eq!(parsed.total_entries, 2);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].position, 1);
        assert_eq!(parsed.materials[0].position, 2);
    }

    #[test]
    fn test_entry_accepts_json_numbers_or_text() {
        let json = r#"{"sds_number":"S1","name":"A","order_quantity":200,
            "cas_entries":[{"cas_number":"67-64-1","percent":"60"},{"cas_number":"7732-18-5","percent":40.5}]}"#;
        let entry: MaterialEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.order_quantity, "200");
        assert_eq!(entry.cas_entries[1].percent, "40.5");
    }

    #[test]
    fn test_malformed_json_numbers_reject_only_that_entry() {
        let json = r#"[
            {"sds_number":"S1","name":"A","order_quantity":200,
             "cas_entries":[{"cas_number":"67-64-1","percent":60},{"cas_number":"7732-18-5","percent":40}]},
            {"sds_number":"S2","name":"B","order_quantity":null,
             "cas_entries":[{"cas_number":"67-64-1","percent":60},{"cas_number":"7732-18-5","percent":40}]},
            {"sds_number":"S3","name":"C","order_quantity":true,
             "cas_entries":[{"cas_number":"67-64-1","percent":{}},{"cas_number":"7732-18-5"}]}
        ]"#;
        let entries: Vec<MaterialEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[1].order_quantity, "");
        assert_eq!(entries[2].order_quantity, "true");
        assert_eq!(entries[2].cas_entries[1].percent, "");

        let parsed = RecordBuilder::new().build_entries(&entries);
        assert_eq!(parsed.materials.len(), 1);
        assert_eq!(parsed.rejected.len(), 2);
        assert!(matches!(
            parsed.rejected[0].error,
            InventoryError::InvalidInput { ref field, .. } if field == "materials[1].order_quantity"
        ));
    }

    #[test]
    fn test_schema_requires_fixed_prefix() {
        let ok = StringRecord::from(vec!["SDS #", "Material Name", "Order Quantity (lbs)", "CAS #1", "% CAS #1"]);
        let schema = CsvSchema::from_headers(&ok).unwrap();
        assert_eq!(schema.cas_groups.len(), 1);
        assert_eq!(schema.cas_groups[0].percent_column, 4);

        let wrong = StringRecord::from(vec!["Material Name", "SDS #", "Order Quantity (lbs)"]);
        assert!(matches!(CsvSchema::from_headers(&wrong), Err(InventoryError::CsvSchema { .. })));

        let odd = StringRecord::from(vec!["SDS #", "Material Name", "Order Quantity (lbs)", "CAS #1"]);
        assert!(matches!(CsvSchema::from_headers(&odd), Err(InventoryError::CsvSchema { .. })));
    }

    #[test]
    fn test_csv_parsing() {
        let csv_data = b"SDS #,Material Name,Order Quantity (lbs),CAS #1,% CAS #1,CAS #2,% CAS #2\n\
S1,Acetone,200,67-64-1,60,7732-18-5,40\n\
S2,Mix,100,NaN,30,64-17-5,70\n\
S3,Short,50,64-17-5,100\n";

        let parsed = RecordBuilder::new().parse_csv(csv_data).unwrap();

        assert_eq!(parsed.source, EntrySource::Csv);
        assert_eq!(parsed.total_entries, 3);
        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.materials[0].row_number, Some(2));
        assert_eq!(parsed.materials[0].material.composition.len(), 2);
        // NaN CAS cell skips the pair
        assert_eq!(parsed.materials[1].material.composition.len(), 1);
        assert_eq!(parsed.materials[1].material.composition[0].cas_number, "64-17-5");
        // short row yields fewer pairs
        assert_eq!(parsed.materials[2].material.composition.len(), 1);
    }

    #[test]
    fn test_csv_bad_row_does_not_abort_batch() {
        let csv_data = b"SDS #,Material Name,Order Quantity (lbs),CAS #1,% CAS #1\n\
S1,A,abc,67-64-1,100\n\
S2,B,10,67-64-1,ten\n\
S3,C,10,67-64-1,100\n";

        let parsed = RecordBuilder::new().parse_csv(csv_data).unwrap();

        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].row_number, Some(2));
        assert!(matches!(
            parsed.rejected[1].error,
            InventoryError::InvalidInput { row: Some(3), .. }
        ));
        assert_eq!(parsed.materials.len(), 1);
        assert_eq!(parsed.materials[0].material.sds_number, "S3");
    }

    #[test]
    fn test_csv_extra_cells_warn() {
        let csv_data = b"SDS #,Material Name,Order Quantity (lbs)\nS1,A,10,67-64-1,100\n";
        let parsed = RecordBuilder::new().parse_csv(csv_data).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.materials[0].material.composition.is_empty());
    }

    #[test]
    fn test_missing_cells() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("NaN"));
        assert!(is_missing("N/A"));
        assert!(!is_missing("0"));
        assert!(!is_missing("7732-18-5"));
    }

    proptest! {
        /// Every CSV data row is either built or rejected, never dropped
        #[test]
        fn prop_csv_rows_accounted_for(
            rows in prop::collection::vec(("[A-Z][0-9]{1,3}", "[0-9]{1,4}|x"), 1..20)
        ) {
            let mut csv = String::from("SDS #,Material Name,Order Quantity (lbs),CAS #1,% CAS #1\n");
            for (sds, qty) in &rows {
                csv.push_str(&format!("{},Mat,{},7732-18-5,100\n", sds, qty));
            }

            let parsed = RecordBuilder::new().parse_csv(csv.as_bytes()).unwrap();
            prop_assert_eq!(parsed.total_entries, rows.len());
            prop_assert_eq!(parsed.materials.len() + parsed.rejected.len(), rows.len());
        }
    }
}
