pub mod classify;
pub mod extract;
pub mod repair;
pub mod schema;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::assemble::{self, Analysis, FileBatch};
use crate::directory::{self, ExtensionDirectory};
use crate::error::{ArtifactError, ArtifactWarning};
use crate::record::{Artifact, CanonicalRecord};
use repair::RepairedRow;
use schema::SchemaVariant;

/// Five-pass pipeline: artifact → raw table → normalized → repaired →
/// resolved against the directory → classified.
pub fn process_artifact(
    artifact: &Artifact,
    directory: &ExtensionDirectory,
) -> Result<FileBatch, ArtifactError> {
    let table = extract::extract(artifact)?;
    let raw_rows = table.rows.len();

    let normalized = schema::normalize(&table)?;
    let variant = normalized.variant;
    let repaired = repair::repair_batch(normalized.rows);
    let resolved = directory::resolve(directory, repaired, |r| r.extension.as_deref());

    debug!(
        file = %artifact.name,
        ?variant,
        raw_rows,
        kept = resolved.len(),
        "processed artifact"
    );

    let records = resolved
        .into_iter()
        .map(|(user, row)| build_record(user, row, variant))
        .collect();

    Ok(FileBatch {
        source: artifact.name.clone(),
        records,
    })
}

fn build_record(user: String, row: RepairedRow, variant: SchemaVariant) -> CanonicalRecord {
    let call_category = classify::classify(variant, row.classification.as_deref());
    let t = row.timing;
    CanonicalRecord {
        extension: row.extension.unwrap_or_default(),
        user,
        connect_time: t.connect_time,
        disconnect_time: t.disconnect_time,
        call_category,
        date: t.date,
        month: t.month,
        weekday: t.weekday,
        duration_seconds: t.duration_seconds,
        source_file: String::new(),
        extras: row.extras,
    }
}

pub fn analyze(artifacts: &[Artifact], directory: &ExtensionDirectory) -> Analysis {
    analyze_with_progress(artifacts, directory, &ProgressBar::hidden())
}

/// Process artifacts one after another. A failing artifact is reported and
/// skipped; it never stops the rest of the batch.
pub fn analyze_with_progress(
    artifacts: &[Artifact],
    directory: &ExtensionDirectory,
    pb: &ProgressBar,
) -> Analysis {
    let mut batches = Vec::with_capacity(artifacts.len());
    let mut warnings = Vec::new();

    for artifact in artifacts {
        pb.set_message(artifact.name.clone());
        match process_artifact(artifact, directory) {
            Ok(batch) if batch.records.is_empty() => {
                warn!(file = %artifact.name, "no rows survived filtering");
                warnings.push(ArtifactWarning::no_rows(&artifact.name));
            }
            Ok(batch) => {
                info!(file = %artifact.name, rows = batch.records.len(), "artifact ok");
                batches.push(batch);
            }
            Err(e) => {
                warn!(file = %artifact.name, error = %e, "skipping artifact");
                warnings.push(ArtifactWarning::from_error(&artifact.name, &e));
            }
        }
        pb.inc(1);
    }

    let records = assemble::assemble(batches);
    let status = assemble::status(artifacts.len(), &records);
    Analysis {
        records,
        warnings,
        status,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::record::CallCategory;

    fn fixture(name: &str) -> Artifact {
        let bytes = std::fs::read(format!("tests/fixtures/{}", name)).unwrap();
        Artifact::new(name, bytes)
    }

    #[test]
    fn legacy_html_end_to_end() {
        let dir = ExtensionDirectory::builtin();
        let batch = process_artifact(&fixture("legacy_export.html"), &dir).unwrap();
        let summary: Vec<_> = batch
            .records
            .iter()
            .map(|r| (r.extension.as_str(), r.user.as_str(), r.call_category.label()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("7773", "AD", "International"),
                ("7789", "PF", "Mobile"),
                ("7725", "CB", "Other External"),
                ("7721", "KS", "Other External"),
            ]
        );
        let first = &batch.records[0];
        assert_eq!(first.extras.get("comment").map(String::as_str), Some("Berlin, office"));
        assert_eq!(first.extras.get("calledNumber").map(String::as_str), Some("00491234567"));
        assert!(!first.extras.contains_key("callingPartyUnicodeLoginUserID"));
        assert_eq!(
            batch.records[3].extras.get("comment").map(String::as_str),
            Some("said \"hi\"")
        );
        // Origination-only exports carry no disconnect, hence no duration.
        assert_eq!(first.duration_seconds, None);
        assert_eq!(first.month.as_deref(), Some("2023-11"));
    }

    #[test]
    fn connect_html_repairs_and_keeps_negative_duration() {
        let dir = ExtensionDirectory::builtin();
        let batch = process_artifact(&fixture("connect_export.html"), &dir).unwrap();
        assert_eq!(batch.records.len(), 3);

        let repaired = &batch.records[0];
        assert_eq!(repaired.connect_time, Some(1_700_000_000));
        assert_eq!(repaired.duration_seconds, Some(600));
        assert_eq!(repaired.call_category, CallCategory::Mobile);

        assert_eq!(batch.records[1].user, "MV");
        assert_eq!(batch.records[1].call_category, CallCategory::International);
        assert_eq!(batch.records[2].duration_seconds, Some(-100));
    }

    #[test]
    fn partition_workbook_end_to_end() {
        let dir = ExtensionDirectory::builtin();
        let batch = process_artifact(&fixture("partition_export.xlsx"), &dir).unwrap();
        let cats: Vec<_> = batch
            .records
            .iter()
            .map(|r| (r.user.as_str(), r.call_category.clone()))
            .collect();
        assert_eq!(
            cats,
            vec![
                ("AD", CallCategory::Partition("Intl".into())),
                ("PF", CallCategory::Partition("Mobile_PT".into())),
            ]
        );
        assert_eq!(batch.records[1].connect_time, Some(1_700_000_000));
        assert_eq!(batch.records[1].duration_seconds, Some(600));
    }

    #[test]
    fn scenario_known_and_unknown_extensions() {
        let html = concat!(
            r#"<script>var gk_fileData = {"s.csv": "#,
            r#""dateTimeConnect,dateTimeDisconnect,callingPartyNumber,finalCalledPartyPattern\r\n"#,
            r#"1700000000,1700000060,7773,9.00491234567\r\n"#,
            r#"1700000000,1700000060,9999,9.00491234567\r\n"#,
            r#"0,1700000600,7789,9.XXXXXXX\r\n"};</script>"#,
        );
        let dir = ExtensionDirectory::builtin();
        let batch = process_artifact(&Artifact::new("s.html", html), &dir).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].user, "AD");
        assert_eq!(batch.records[0].call_category, CallCategory::International);
        assert!(batch.records.iter().all(|r| r.extension != "9999"));
        assert_eq!(batch.records[1].connect_time, Some(1_700_000_000));
        assert_eq!(batch.records[1].duration_seconds, Some(600));
    }

    #[test]
    fn every_record_has_a_directory_user() {
        let dir = ExtensionDirectory::builtin();
        let artifacts = [
            fixture("legacy_export.html"),
            fixture("connect_export.html"),
            fixture("partition_export.xlsx"),
        ];
        let analysis = analyze(&artifacts, &dir);
        assert!(!analysis.records.is_empty());
        for r in &analysis.records {
            assert_eq!(dir.user(&r.extension), Some(r.user.as_str()));
        }
    }

    #[test]
    fn bad_artifact_does_not_stop_the_batch() {
        let dir = ExtensionDirectory::builtin();
        let artifacts = [
            fixture("no_data.html"),
            fixture("legacy_export.html"),
            fixture("wrong_sheet.xlsx"),
            Artifact::new("notes.txt", "hello"),
        ];
        let analysis = analyze(&artifacts, &dir);
        assert_eq!(analysis.records.len(), 4);
        assert!(analysis.records.iter().all(|r| r.source_file == "legacy_export.html"));

        let kinds: Vec<_> = analysis
            .warnings
            .iter()
            .map(|w| (w.source.as_str(), w.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("no_data.html", WarningKind::NoEmbeddedData),
                ("wrong_sheet.xlsx", WarningKind::ParseFailed),
                ("notes.txt", WarningKind::Unsupported),
            ]
        );
        assert_eq!(analysis.status, assemble::BatchStatus::Ready(4));
    }

    #[test]
    fn extreme_timestamps_do_not_stop_the_batch() {
        let html = concat!(
            r#"gk_fileData = {"x.csv": "dateTimeConnect,dateTimeDisconnect,callingPartyNumber,finalCalledPartyPattern\r\n"#,
            r#"-9223372036854775000,1e30,7789,9.00!\r\n"#,
            r#"0,-9223372036854775800,7773,9.08123\r\n"}"#,
        );
        let dir = ExtensionDirectory::builtin();
        let artifacts = [Artifact::new("extreme.html", html), fixture("legacy_export.html")];
        let analysis = analyze(&artifacts, &dir);

        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.records.len(), 6);
        let extreme: Vec<_> = analysis
            .records
            .iter()
            .filter(|r| r.source_file == "extreme.html")
            .collect();
        assert_eq!(extreme.len(), 2);
        assert!(extreme.iter().all(|r| r.duration_seconds.is_none()));
        assert!(extreme.iter().all(|r| r.month.is_none()));
        assert_eq!(extreme[1].connect_time, None);
        assert_eq!(
            analysis.records.iter().filter(|r| r.source_file == "legacy_export.html").count(),
            4
        );
    }

    #[test]
    fn file_with_only_unknown_extensions_warns() {
        let html = r#"gk_fileData = {"u.csv": "dateTimeOrigination,callingPartyNumber\r\n1700000000,9999\r\n"}"#;
        let dir = ExtensionDirectory::builtin();
        let analysis = analyze(&[Artifact::new("u.html", html)], &dir);
        assert!(analysis.records.is_empty());
        assert_eq!(analysis.warnings[0].kind, WarningKind::NoRowsSurvived);
        assert_eq!(analysis.status, assemble::BatchStatus::NothingSurvived);
    }

    #[test]
    fn no_artifacts() {
        let analysis = analyze(&[], &ExtensionDirectory::builtin());
        assert_eq!(analysis.status, assemble::BatchStatus::NoArtifacts);
        assert!(analysis.warnings.is_empty());
    }
}
