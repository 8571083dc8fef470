//! Leitura dos itens de entrada e escrita do relatório de status em CSV.
//!
//! A entrada precisa de um cabeçalho com as colunas `subject` e `topic`
//! (outras colunas são ignoradas). Linhas com qualquer um dos dois campos
//! vazio ou ausente são descartadas. O relatório tem as colunas
//! `topic,status`, uma linha por item, na mesma ordem da entrada.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Deserialize;
use thiserror::Error;

use crate::item::{Outcome, WorkItem};

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

impl InputRow {
    fn into_item(self) -> Option<WorkItem> {
        let subject = self.subject?.trim().to_string();
        let topic = self.topic?.trim().to_string();
        if subject.is_empty() || topic.is_empty() {
            return None;
        }
        Some(WorkItem { subject, topic })
    }
}

/// Name of the status report for an input file: `topics.csv` becomes
/// `topics_status.csv`.
pub fn report_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    format!("{stem}_status.csv")
}

/// Reads work items from CSV, keeping file order and dropping malformed rows.
pub fn read_items<R: Read>(reader: R) -> Result<Vec<WorkItem>, CsvError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut items = Vec::new();
    for row in rdr.deserialize::<InputRow>() {
        if let Some(item) = row?.into_item() {
            items.push(item);
        }
    }
    Ok(items)
}

pub async fn read_items_from_path(path: &Path) -> Result<Vec<WorkItem>, CsvError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CsvError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_items(bytes.as_slice())
}

/// Writes the `topic,status` report. The header is written even for an empty
/// batch.
pub fn write_report<W: Write>(writer: W, outcomes: &[Outcome]) -> Result<(), CsvError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["topic", "status"])?;
    for outcome in outcomes {
        let status = outcome.status.to_string();
        wtr.write_record([outcome.topic.as_str(), status.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the report to `path`, creating its parent directory if needed.
pub async fn write_report_to_path(path: &Path, outcomes: &[Outcome]) -> Result<(), CsvError> {
    let mut buf = Vec::new();
    write_report(&mut buf, outcomes)?;

    let write_err = |source: std::io::Error| CsvError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, buf).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_name_replaces_extension() {
        assert_eq!(report_name("topics.csv"), "topics_status.csv");
    }

    #[test]
    fn report_name_keeps_inner_dots() {
        assert_eq!(report_name("my.topics.csv"), "my.topics_status.csv");
    }

    #[test]
    fn report_name_without_extension() {
        assert_eq!(report_name("topics"), "topics_status.csv");
    }

    #[test]
    fn reads_rows_in_order_and_trims() {
        let data = "subject,topic\nMath, Algebra \n  Science,Biology\n";
        let items = read_items(data.as_bytes()).unwrap();
        assert_eq!(
            items,
            vec![
                WorkItem::new("Math", "Algebra"),
                WorkItem::new("Science", "Biology")
            ]
        );
    }

    #[test]
    fn drops_rows_missing_a_field() {
        let data = "subject,topic\nMath,\n,Biology\nHistory,Rome\nArt\n";
        let items = read_items(data.as_bytes()).unwrap();
        assert_eq!(items, vec![WorkItem::new("History", "Rome")]);
    }

    #[test]
    fn columns_are_matched_by_name() {
        let data = "id,topic,subject\n1,Algebra,Math\n";
        let items = read_items(data.as_bytes()).unwrap();
        assert_eq!(items, vec![WorkItem::new("Math", "Algebra")]);
    }

    #[test]
    fn missing_column_yields_no_items() {
        let data = "subject,title\nMath,Algebra\n";
        assert!(read_items(data.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn writes_header_and_rows() {
        let mut out = Vec::new();
        write_report(
            &mut out,
            &[Outcome::succeeded("Topic 1"), Outcome::failed("Topic 2")],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "topic,status\nTopic 1,Succeeded\nTopic 2,Failed\n"
        );
    }

    #[test]
    fn empty_report_still_has_header() {
        let mut out = Vec::new();
        write_report(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "topic,status\n");
    }

    #[tokio::test]
    async fn path_roundtrip_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("topics.csv");
        tokio::fs::write(&input, "subject,topic\nMath,Algebra\n")
            .await
            .unwrap();
        let items = read_items_from_path(&input).await.unwrap();
        assert_eq!(items.len(), 1);

        let output = dir.path().join("nested/out").join(report_name("topics.csv"));
        write_report_to_path(&output, &[Outcome::succeeded("Algebra")])
            .await
            .unwrap();
        let written = tokio::fs::read_to_string(&output).await.unwrap();
        assert_eq!(written, "topic,status\nAlgebra,Succeeded\n");
    }

    #[tokio::test]
    async fn missing_input_reports_path() {
        let err = read_items_from_path(Path::new("/nonexistent/topics.csv"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/topics.csv"));
    }
}
