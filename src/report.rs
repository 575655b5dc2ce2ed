//! CSV and JSON report generation.
//!
//! Both files of one run share a timestamped stem, e.g.
//! `scopus_unb_autores_2025-01-31_14-05-09.csv` / `.json`.

use crate::authors::summarize_authors;
use crate::error::Result;
use crate::models::{value_to_string, DocumentRecord, FlattenedRecord};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// UTF-8 byte order mark, so spreadsheet software detects the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row of both reports, matching the serialized names of [`FlattenedRecord`]
pub const REPORT_COLUMNS: &[&str] = &[
    "titulo",
    "ano",
    "autores_unb_detalhado",
    "autores_unb_ids",
    "todos_autores",
    "revista",
    "citacoes",
    "doi",
    "link",
];

/// Paths of the files written by [`save_reports`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Project a raw document onto a report row.
pub fn flatten(doc: &DocumentRecord, institution_id: &str) -> FlattenedRecord {
    let authors = summarize_authors(doc, institution_id);

    FlattenedRecord {
        title: doc.title.clone().unwrap_or_else(|| "N/A".to_string()),
        year: doc
            .cover_date
            .as_deref()
            .map(|d| d.chars().take(4).collect())
            .unwrap_or_default(),
        affiliated_authors: authors.affiliated_detailed,
        affiliated_author_ids: authors.affiliated_ids,
        all_authors: authors.all_authors,
        journal: doc
            .publication_name
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        citations: doc
            .cited_by_count
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_else(|| "0".to_string()),
        doi: doc.doi.clone().unwrap_or_default(),
        link: doc.scopus_link().unwrap_or_default().to_string(),
    }
}

pub fn flatten_all(docs: &[DocumentRecord], institution_id: &str) -> Vec<FlattenedRecord> {
    docs.iter().map(|d| flatten(d, institution_id)).collect()
}

/// File stem `<prefix>_<YYYY-MM-DD_HH-MM-SS>`.
pub fn report_stem(prefix: &str, now: &DateTime<Local>) -> String {
    format!("{}_{}", prefix, now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Write a BOM-prefixed, semicolon-delimited CSV with a header row and LF line endings.
pub fn write_csv(path: &Path, records: &[FlattenedRecord]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(file);

    // Written explicitly so an empty slice still gets a header row
    wtr.write_record(REPORT_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the records as a pretty-printed JSON array (4-space indent, non-ASCII kept as is).
pub fn write_json(path: &Path, records: &[FlattenedRecord]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut file, formatter);
    records.serialize(&mut ser)?;

    file.flush()?;
    Ok(())
}

/// Write the CSV and JSON reports into `dir` under a shared timestamped stem.
pub fn save_reports(
    dir: &Path,
    prefix: &str,
    records: &[FlattenedRecord],
    now: &DateTime<Local>,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(dir)?;

    let stem = report_stem(prefix, now);
    let paths = ReportPaths {
        csv: dir.join(format!("{}.csv", stem)),
        json: dir.join(format!("{}.json", stem)),
    };

    write_csv(&paths.csv, records)?;
    write_json(&paths.json, records)?;

    info!(
        records = records.len(),
        csv = %paths.csv.display(),
        json = %paths.json.display(),
        "Reports saved"
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_INSTITUTION_ID;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: serde_json::Value) -> DocumentRecord {
        serde_json::from_value(value).expect("valid document fixture")
    }

    fn sample_docs() -> Vec<DocumentRecord> {
        vec![
            doc(json!({
                "dc:title": "Ecologia do Cerrado; revisão",
                "prism:coverDate": "2024-05-01",
                "prism:publicationName": "Acta Botânica",
                "citedby-count": "12",
                "prism:doi": "10.1000/xyz",
                "link": [
                    {"@ref": "self", "@href": "https://api.elsevier.com/1"},
                    {"@ref": "scopus", "@href": "https://www.scopus.com/1"}
                ],
                "author": [
                    {"authname": "Silva M.", "authid": "558899", "afid": [{"$": "60024989"}]},
                    {"authname": "Doe J.", "authid": "2", "afid": [{"$": "999"}]}
                ]
            })),
            doc(json!({"dc:title": "Bare"})),
        ]
    }

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 31, 14, 5, 9)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn test_flatten_full_record() {
        let docs = sample_docs();
        let row = flatten(&docs[0], DEFAULT_INSTITUTION_ID);

        assert_eq!(row.title, "Ecologia do Cerrado; revisão");
        assert_eq!(row.year, "2024");
        assert_eq!(row.affiliated_authors, "Silva M. [558899]");
        assert_eq!(row.affiliated_author_ids, "558899");
        assert_eq!(row.all_authors, "Silva M.; Doe J.");
        assert_eq!(row.journal, "Acta Botânica");
        assert_eq!(row.citations, "12");
        assert_eq!(row.doi, "10.1000/xyz");
        assert_eq!(row.link, "https://www.scopus.com/1");
    }

    #[test]
    fn test_flatten_defaults() {
        let row = flatten(&doc(json!({})), DEFAULT_INSTITUTION_ID);

        assert_eq!(row.title, "N/A");
        assert_eq!(row.year, "");
        assert_eq!(row.journal, "N/A");
        assert_eq!(row.citations, "0");
        assert_eq!(row.doi, "");
        assert_eq!(row.link, "");
        assert_eq!(row.all_authors, "");
    }

    #[test]
    fn test_flatten_numeric_citations_and_short_date() {
        let row = flatten(
            &doc(json!({"citedby-count": 7, "prism:coverDate": "20"})),
            DEFAULT_INSTITUTION_ID,
        );
        assert_eq!(row.citations, "7");
        assert_eq!(row.year, "20");
    }

    #[test]
    fn test_report_stem() {
        assert_eq!(
            report_stem("scopus_unb_autores", &fixed_time()),
            "scopus_unb_autores_2025-01-31_14-05-09"
        );
    }

    #[test]
    fn test_save_reports_writes_matching_files() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("reports");
        let records = flatten_all(&sample_docs(), DEFAULT_INSTITUTION_ID);

        let paths = save_reports(&out, "scopus_unb_autores", &records, &fixed_time())?;
        assert_eq!(
            paths.csv.file_name().and_then(|n| n.to_str()),
            Some("scopus_unb_autores_2025-01-31_14-05-09.csv")
        );
        assert_eq!(
            paths.json.file_name().and_then(|n| n.to_str()),
            Some("scopus_unb_autores_2025-01-31_14-05-09.json")
        );

        // CSV: BOM, semicolon delimiter, header, one row per record
        let raw = std::fs::read(&paths.csv)?;
        assert!(raw.starts_with(UTF8_BOM));
        let text = String::from_utf8(raw[UTF8_BOM.len()..].to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        assert!(text.starts_with(
            "titulo;ano;autores_unb_detalhado;autores_unb_ids;todos_autores;revista;citacoes;doi;link\n"
        ));
        assert!(!text.contains('\r'));
        assert_eq!(text.lines().count(), records.len() + 1);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(text.as_bytes());
        let csv_rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<FlattenedRecord>, csv::Error>>()?;

        // JSON: non-ASCII preserved, 4-space indent
        let json_text = std::fs::read_to_string(&paths.json)?;
        assert!(json_text.contains("revisão"));
        assert!(json_text.contains("\n        \"titulo\": \"Ecologia do Cerrado; revisão\""));
        assert!(json_text.contains("\"autores_unb_ids\": \"558899\""));
        let json_rows: Vec<FlattenedRecord> = serde_json::from_str(&json_text)?;

        assert_eq!(json_rows, records);
        assert_eq!(csv_rows.len(), json_rows.len());
        for (c, j) in csv_rows.iter().zip(&json_rows) {
            assert_eq!(c.title, j.title);
            assert_eq!(c.year, j.year);
            assert_eq!(c.doi, j.doi);
        }
        Ok(())
    }

    #[test]
    fn test_single_record_writes_both_files() -> Result<()> {
        let dir = TempDir::new()?;
        let records = flatten_all(&sample_docs()[..1], DEFAULT_INSTITUTION_ID);

        let paths = save_reports(dir.path(), "single", &records, &fixed_time())?;
        assert!(paths.csv.exists());
        assert!(paths.json.exists());
        Ok(())
    }
}
