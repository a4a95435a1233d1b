//! Document builder: four document families plus the metadata catalog.
//!
//! Family order is fixed: row documents, event-code summaries,
//! establishment summaries, dataset overview. The similarity index is
//! positionally aligned with this list, so ordering is part of the contract.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde_json::json;
use tracing::debug;

use courier_core::catalog::Catalog;
use courier_core::config::defaults::{MAX_SUMMARY_EXAMPLES, OVERVIEW_TOP_ESTABLISHMENTS};
use courier_core::config::FieldBindings;
use courier_core::dataset::{is_present, value_text, Dataset, Row};
use courier_core::document::{Document, DocumentKind};

/// Builds document views over one dataset.
pub struct DocumentBuilder {
    bindings: FieldBindings,
}

impl DocumentBuilder {
    pub fn new(bindings: FieldBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &FieldBindings {
        &self.bindings
    }

    /// Build all document families and the catalog for a dataset.
    pub fn build(&self, dataset: &Dataset) -> (Vec<Document>, Catalog) {
        let catalog = self.extract_catalog(dataset);
        if dataset.is_empty() {
            return (Vec::new(), catalog);
        }

        let mut documents = self.row_documents(dataset);
        documents.extend(self.code_summaries(dataset, &catalog));
        documents.extend(self.establishment_summaries(dataset, &catalog));
        documents.push(self.overview_document(dataset, &catalog));

        debug!(
            rows = dataset.len(),
            documents = documents.len(),
            codes = catalog.event_codes.len(),
            establishments = catalog.establishments.len(),
            "document build complete"
        );

        (documents, catalog)
    }

    /// Derive only the catalog (used when documents are loaded from disk).
    pub fn extract_catalog(&self, dataset: &Dataset) -> Catalog {
        let mut catalog = Catalog::default();

        let code_col = self.bound(dataset, &self.bindings.event_code);
        let name_col = self.bound(dataset, &self.bindings.event_name);
        let establishment_col = self.bound(dataset, &self.bindings.establishment);
        let item_col = self.bound(dataset, &self.bindings.item_id);

        for row in dataset.rows() {
            if let Some(code) = code_col.and_then(|c| present_text(row, c)) {
                if let Some(name_col) = name_col {
                    if !catalog.event_code_names.contains_key(&code) {
                        if let Some(name) = present_text(row, name_col) {
                            catalog.event_code_names.insert(code.clone(), name);
                        }
                    }
                }
                catalog.event_codes.insert(code);
            }
            if let Some(est) = establishment_col.and_then(|c| present_text(row, c)) {
                catalog.establishments.insert(est);
            }
            if let Some(item) = item_col.and_then(|c| present_text(row, c)) {
                catalog.item_ids.insert(item.trim().to_string());
            }
        }

        catalog
    }

    /// One document per dataset row: `"col: value"` lines in column order,
    /// metadata carrying the row index and every non-null field verbatim.
    fn row_documents(&self, dataset: &Dataset) -> Vec<Document> {
        dataset
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut lines = Vec::new();
                let mut metadata = HashMap::new();
                metadata.insert("row_index".to_string(), json!(idx));
                for col in dataset.columns() {
                    if let Some(value) = row.get(col) {
                        if is_present(value) {
                            lines.push(format!("{col}: {}", value_text(value)));
                            metadata.insert(col.clone(), value.clone());
                        }
                    }
                }
                Document::new(lines.join("\n"), metadata, DocumentKind::Row)
            })
            .collect()
    }

    /// One summary per distinct event code: resolved name, record count, and
    /// up to three example rows rendered as pipe-joined field lists.
    fn code_summaries(&self, dataset: &Dataset, catalog: &Catalog) -> Vec<Document> {
        let Some(code_col) = self.bound(dataset, &self.bindings.event_code) else {
            return Vec::new();
        };

        catalog
            .event_codes
            .iter()
            .map(|code| {
                let rows: Vec<&Row> = dataset
                    .rows()
                    .iter()
                    .filter(|row| present_text(row, code_col).as_deref() == Some(code))
                    .collect();
                let name = catalog.code_name(code);

                let mut text = format!("Event Code {code}: {name}\nRecords: {}", rows.len());
                let examples: Vec<String> = rows
                    .iter()
                    .take(MAX_SUMMARY_EXAMPLES)
                    .map(|row| pipe_joined(row, dataset.columns()))
                    .collect();
                if !examples.is_empty() {
                    text.push_str("\nExamples:\n");
                    text.push_str(&examples.join("\n"));
                }

                let metadata = HashMap::from([
                    ("event_code".to_string(), json!(code)),
                    ("event_name".to_string(), json!(name)),
                    ("record_count".to_string(), json!(rows.len())),
                ]);
                Document::new(text, metadata, DocumentKind::EventCodeSummary)
            })
            .collect()
    }

    /// One summary per distinct establishment: record count plus the
    /// distinct (code, name) pairs observed there.
    fn establishment_summaries(&self, dataset: &Dataset, catalog: &Catalog) -> Vec<Document> {
        let Some(est_col) = self.bound(dataset, &self.bindings.establishment) else {
            return Vec::new();
        };
        let code_col = self.bound(dataset, &self.bindings.event_code);

        catalog
            .establishments
            .iter()
            .map(|est| {
                let rows: Vec<&Row> = dataset
                    .rows()
                    .iter()
                    .filter(|row| present_text(row, est_col).as_deref() == Some(est))
                    .collect();

                let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
                if let Some(code_col) = code_col {
                    for row in &rows {
                        if let Some(code) = present_text(row, code_col) {
                            let name = catalog.code_name(&code).to_string();
                            pairs.insert((code, name));
                        }
                    }
                }

                let mut text = format!("Establishment: {est}\nRecords: {}", rows.len());
                if !pairs.is_empty() {
                    let listing: Vec<String> = pairs
                        .iter()
                        .map(|(code, name)| format!("{code} ({name})"))
                        .collect();
                    text.push_str("\nEvent types seen: ");
                    text.push_str(&listing.join(", "));
                }

                let metadata = HashMap::from([
                    ("establishment".to_string(), json!(est)),
                    ("record_count".to_string(), json!(rows.len())),
                ]);
                Document::new(text, metadata, DocumentKind::EstablishmentSummary)
            })
            .collect()
    }

    /// The single whole-dataset overview document.
    fn overview_document(&self, dataset: &Dataset, catalog: &Catalog) -> Document {
        let mut text = format!("Dataset overview\nTotal records: {}", dataset.len());

        let code_col = self.bound(dataset, &self.bindings.event_code);
        if let Some(code_col) = code_col {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for row in dataset.rows() {
                if let Some(value) = row.get(code_col).filter(|v| is_present(v)) {
                    let code = value_text(value);
                    if let Some(known) = catalog.event_codes.get(&code) {
                        *counts.entry(known.as_str()).or_default() += 1;
                    }
                }
            }
            if !counts.is_empty() {
                text.push_str("\nEvent code breakdown:");
                for (code, count) in &counts {
                    text.push_str(&format!("\n  {code} ({}): {count}", catalog.code_name(code)));
                }
            }
        }

        if let Some(est_col) = self.bound(dataset, &self.bindings.establishment) {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for row in dataset.rows() {
                if let Some(est) = present_text(row, est_col) {
                    *counts.entry(est).or_default() += 1;
                }
            }
            let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(OVERVIEW_TOP_ESTABLISHMENTS);
            if !ranked.is_empty() {
                let listing: Vec<String> = ranked
                    .iter()
                    .map(|(est, count)| format!("{est} ({count})"))
                    .collect();
                text.push_str("\nTop establishments: ");
                text.push_str(&listing.join(", "));
            }
        }

        if let Some(date_col) = self.bound(dataset, &self.bindings.event_date) {
            if let Some((min, max)) = self.date_span(dataset, date_col) {
                text.push_str(&format!("\nDate range: {min} to {max}"));
            }
        }

        let metadata = HashMap::from([
            ("overview".to_string(), json!(true)),
            ("total_records".to_string(), json!(dataset.len())),
        ]);
        Document::new(text, metadata, DocumentKind::DatasetOverview)
    }

    /// Min/max of the date column. Any present value that fails to parse
    /// swallows the whole span: the date line is omitted rather than failing
    /// the build.
    fn date_span(&self, dataset: &Dataset, date_col: &str) -> Option<(String, String)> {
        let mut dates: Vec<NaiveDateTime> = Vec::new();
        for row in dataset.rows() {
            let Some(raw) = present_text(row, date_col) else {
                continue;
            };
            match parse_date_like(&raw) {
                Some(parsed) => dates.push(parsed),
                None => {
                    debug!(value = raw.as_str(), "unparsable date, omitting date span");
                    return None;
                }
            }
        }
        let min = dates.iter().min()?;
        let max = dates.iter().max()?;
        Some((
            min.format("%Y-%m-%d").to_string(),
            max.format("%Y-%m-%d").to_string(),
        ))
    }

    /// Resolve a binding to a column the dataset actually has.
    fn bound<'a>(&'a self, dataset: &Dataset, binding: &'a Option<String>) -> Option<&'a str> {
        binding
            .as_deref()
            .filter(|name| dataset.has_column(name))
    }
}

/// Present (non-null, non-blank) cell rendered as text.
fn present_text(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .filter(|v| is_present(v))
        .map(value_text)
}

/// Non-null fields of a row as a single `col: value | col: value` line.
fn pipe_joined(row: &Row, columns: &[String]) -> String {
    columns
        .iter()
        .filter_map(|col| {
            row.get(col)
                .filter(|v| is_present(v))
                .map(|v| format!("{col}: {}", value_text(v)))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Try the date layouts seen in event feeds, most specific first.
fn parse_date_like(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d/%m/%Y",
    ];
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    // Date-only values parse as midnight.
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::dataset::Dataset;

    fn sample_dataset() -> Dataset {
        let csv = "\
MAILITM_FID,EVENT_TYPE_CD,EVENT_TYPE_NM,établissement_postal,date
RR111111111FR,10,Received,Paris Nord,2024-01-02
RR222222222FR,12,Delivered,Lyon Part-Dieu,2024-01-05
RR111111111FR,12,Delivered,Paris Nord,2024-01-06
RR333333333FR,11,In transit,,2024-01-04
";
        Dataset::from_csv_reader(csv.as_bytes()).unwrap()
    }

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(FieldBindings::default())
    }

    #[test]
    fn builds_all_four_families_in_order() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        // 4 rows + 3 codes + 2 establishments + 1 overview.
        assert_eq!(documents.len(), 10);
        assert!(documents[..4]
            .iter()
            .all(|d| d.kind == DocumentKind::Row));
        assert!(documents[4..7]
            .iter()
            .all(|d| d.kind == DocumentKind::EventCodeSummary));
        assert!(documents[7..9]
            .iter()
            .all(|d| d.kind == DocumentKind::EstablishmentSummary));
        assert_eq!(documents[9].kind, DocumentKind::DatasetOverview);
    }

    #[test]
    fn row_documents_carry_fields_and_index() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        let row = &documents[0];
        assert!(row.text.contains("MAILITM_FID: RR111111111FR"));
        assert!(row.text.contains("EVENT_TYPE_CD: 10"));
        assert_eq!(row.metadata["row_index"], json!(0));
        assert_eq!(row.metadata["EVENT_TYPE_NM"], json!("Received"));
    }

    #[test]
    fn row_document_skips_null_fields() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        // Row 3 has an empty establishment cell.
        let row = &documents[3];
        assert!(!row.text.contains("établissement_postal"));
        assert!(!row.metadata.contains_key("établissement_postal"));
    }

    #[test]
    fn code_summary_resolves_name_and_count() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        let summary = documents
            .iter()
            .find(|d| {
                d.kind == DocumentKind::EventCodeSummary && d.metadata["event_code"] == json!("12")
            })
            .expect("summary for code 12");
        assert!(summary.text.starts_with("Event Code 12: Delivered"));
        assert!(summary.text.contains("Records: 2"));
        assert!(summary.text.contains("Examples:"));
        assert_eq!(summary.metadata["record_count"], json!(2));
    }

    #[test]
    fn establishment_summary_lists_code_pairs() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        let summary = documents
            .iter()
            .find(|d| {
                d.kind == DocumentKind::EstablishmentSummary
                    && d.metadata["establishment"] == json!("Paris Nord")
            })
            .expect("summary for Paris Nord");
        assert!(summary.text.contains("Records: 2"));
        assert!(summary.text.contains("10 (Received)"));
        assert!(summary.text.contains("12 (Delivered)"));
    }

    #[test]
    fn overview_has_counts_and_date_span() {
        let ds = sample_dataset();
        let (documents, _) = builder().build(&ds);

        let overview = &documents[9];
        assert!(overview.text.contains("Total records: 4"));
        assert!(overview.text.contains("12 (Delivered): 2"));
        assert!(overview.text.contains("Top establishments: Paris Nord (2)"));
        assert!(overview.text.contains("Date range: 2024-01-02 to 2024-01-06"));
    }

    #[test]
    fn bad_dates_omit_span_without_failing() {
        let csv = "\
EVENT_TYPE_CD,EVENT_TYPE_NM,date
10,Received,not-a-date
12,Delivered,2024-01-05
";
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        let (documents, _) = builder().build(&ds);
        let overview = documents.last().unwrap();
        assert!(!overview.text.contains("Date range"));
        assert!(overview.text.contains("Total records: 2"));
    }

    #[test]
    fn catalog_collects_codes_names_and_ids() {
        let ds = sample_dataset();
        let catalog = builder().extract_catalog(&ds);

        assert_eq!(
            catalog.event_codes,
            BTreeSet::from(["10".to_string(), "11".to_string(), "12".to_string()])
        );
        assert_eq!(catalog.code_name("12"), "Delivered");
        assert_eq!(catalog.establishments.len(), 2);
        assert_eq!(catalog.item_ids.len(), 3);
        assert!(catalog.item_ids.contains("RR111111111FR"));
    }

    #[test]
    fn first_non_null_name_wins() {
        let csv = "\
EVENT_TYPE_CD,EVENT_TYPE_NM
12,First name
12,Second name
";
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        let catalog = builder().extract_catalog(&ds);
        assert_eq!(catalog.code_name("12"), "First name");
    }

    #[test]
    fn unbound_columns_skip_their_families() {
        let ds = sample_dataset();
        let b = DocumentBuilder::new(FieldBindings::none());
        let (documents, catalog) = b.build(&ds);

        // Rows + overview only.
        assert_eq!(documents.len(), 5);
        assert!(catalog.event_codes.is_empty());
        assert!(catalog.item_ids.is_empty());
    }

    #[test]
    fn empty_dataset_builds_nothing() {
        let ds = Dataset::default();
        let (documents, catalog) = builder().build(&ds);
        assert!(documents.is_empty());
        assert!(catalog.event_codes.is_empty());
    }
}
