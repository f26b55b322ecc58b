// refclean: Integrity checking and deduplication of FASTA reference databases.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Anomaly reports built from the header occurrences of a pass.
//!
//! A [Report] holds:
//!
//!   - Headers that appear more than once in the same file
//!     ([RepetitiveHeader]), written to [HEADERS_REPORT].
//!   - Accession IDs that appear more than once in the same file
//!     ([RepetitiveAccession]), written to [ACCESSIONS_REPORT] if requested.
//!   - Sequence lines found before the first header of a file
//!     ([OrphanLine]), appended to [ORPHANS_LOG] while files are processed.
//!
//! The tables are only written when they have at least one row.
//!

pub mod accessions;
pub mod headers;
pub mod orphans;

use crate::clean::OrphanLine;
use crate::occurrence::Occurrences;

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use indexmap::map::IndexMap;
use log::info;

type E = Box<dyn std::error::Error>;

/// File name of the repetitive header table.
pub const HEADERS_REPORT: &str = "repetitive_headers_report.tsv";
/// File name of the repeated accession ID table.
pub const ACCESSIONS_REPORT: &str = "duplicate_accession_ids_report.tsv";
/// File name of the orphan sequence line log.
pub const ORPHANS_LOG: &str = "sequences_without_headers.txt";

/// A header seen more than once in one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepetitiveHeader {
    pub file_name: String,
    pub header: String,
    pub repetitions: usize,
    pub line_numbers: Vec<usize>,
    /// Number of different gap-free sequences found under the header.
    pub distinct_sequences: usize,
}

impl RepetitiveHeader {
    /// True if the repeats do not all carry the same sequence.
    pub fn has_conflicting_sequences(&self) -> bool {
        self.distinct_sequences > 1
    }
}

/// An accession ID seen more than once in one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepetitiveAccession {
    pub file_name: String,
    pub accession: String,
    pub repetitions: usize,
    /// Full header of each appearance, in line order.
    pub headers: Vec<String>,
}

/// Anomalies found during a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub repetitive_headers: Vec<RepetitiveHeader>,
    pub repetitive_accessions: Vec<RepetitiveAccession>,
    pub orphans: Vec<OrphanLine>,
}

impl Report {
    /// True if no header appears twice within a file.
    pub fn all_headers_unique(&self) -> bool {
        self.repetitive_headers.is_empty()
    }

    /// True if any file had sequence lines before its first header.
    pub fn any_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }
}

/// Returns the accession ID of a header.
///
/// The accession ID is the text between the leading `>` and the first `;`.
/// Returns None if `header` does not start with `>` or the ID is empty.
///
pub fn extract_accession_id(
    header: &str,
) -> Option<&str> {
    let id = header.strip_prefix('>')?.split(';').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Lists every header with more than one occurrence.
///
/// Rows follow the order in which the headers first appeared.
pub fn build_header_rows(
    occurrences: &Occurrences,
) -> Vec<RepetitiveHeader> {
    occurrences.iter().filter(|(_, entry)| entry.count > 1).map(|(key, entry)| {
        RepetitiveHeader{
            file_name: key.file_name.clone(),
            header: key.header.clone(),
            repetitions: entry.count,
            line_numbers: entry.line_numbers.clone(),
            distinct_sequences: entry.sequences.len(),
        }
    }).collect()
}

/// Lists every accession ID with more than one occurrence in a file.
///
/// Headers that share an accession ID but differ elsewhere count towards
/// the same row.
pub fn build_accession_rows(
    occurrences: &Occurrences,
) -> Vec<RepetitiveAccession> {
    let mut grouped: IndexMap<(String, String), Vec<(usize, String)>> = IndexMap::new();
    occurrences.iter().for_each(|(key, entry)| {
        if let Some(accession) = extract_accession_id(&key.header) {
            let seen = grouped.entry((key.file_name.clone(), accession.to_string())).or_default();
            entry.line_numbers.iter().for_each(|line_number| {
                seen.push((*line_number, key.header.clone()));
            });
        }
    });

    grouped.into_iter().filter(|(_, seen)| seen.len() > 1).map(|((file_name, accession), mut seen)| {
        seen.sort_by_key(|(line_number, _)| *line_number);
        RepetitiveAccession{
            file_name,
            accession,
            repetitions: seen.len(),
            headers: seen.into_iter().map(|(_, header)| header).collect(),
        }
    }).collect()
}

/// Builds the report for a finished pass.
///
/// ## Usage
///
/// ```rust
/// use refclean::occurrence::Occurrences;
/// use refclean::report::build_report;
///
/// let mut occurrences = Occurrences::new();
/// occurrences.record_header("a.fasta", ">seq1", 1);
/// occurrences.record_header("a.fasta", ">seq1", 3);
/// occurrences.record_header("a.fasta", ">seq2", 5);
///
/// let report = build_report(&occurrences, Vec::new());
///
/// assert!(!report.all_headers_unique());
/// assert!(!report.any_orphans());
/// assert_eq!(report.repetitive_headers[0].line_numbers, vec![1, 3]);
/// ```
///
pub fn build_report(
    occurrences: &Occurrences,
    orphans: Vec<OrphanLine>,
) -> Report {
    Report{
        repetitive_headers: build_header_rows(occurrences),
        repetitive_accessions: build_accession_rows(occurrences),
        orphans,
    }
}

/// Writes the tables of `report` that have rows to `report_dir`.
///
/// The accession table is only written if `with_accessions` is set. The
/// orphan log is not written here, see [orphans::append_orphans].
///
/// Returns the paths that were written.
///
pub fn write_report_tables(
    report: &Report,
    report_dir: &Path,
    with_accessions: bool,
) -> Result<Vec<PathBuf>, E> {
    let mut written: Vec<PathBuf> = Vec::new();

    if !report.repetitive_headers.is_empty() {
        let path = report_dir.join(HEADERS_REPORT);
        let mut conn = BufWriter::new(File::create(&path)?);
        headers::format_headers_table(&report.repetitive_headers, &mut conn)?;
        info!("wrote {} repetitive headers to {}", report.repetitive_headers.len(), path.display());
        written.push(path);
    }

    if with_accessions && !report.repetitive_accessions.is_empty() {
        let path = report_dir.join(ACCESSIONS_REPORT);
        let mut conn = BufWriter::new(File::create(&path)?);
        accessions::format_accessions_table(&report.repetitive_accessions, &mut conn)?;
        info!("wrote {} repeated accession IDs to {}", report.repetitive_accessions.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Deletes report files left over from an earlier pass.
pub fn remove_stale_reports(
    report_dir: &Path,
) -> Result<(), E> {
    for name in [HEADERS_REPORT, ACCESSIONS_REPORT, ORPHANS_LOG] {
        let path = report_dir.join(name);
        if path.is_file() {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Format a human readable summary of `report`.
///
/// `report_dir` is only used to point at the written files. `conn` is
/// flushed before returning.
///
pub fn format_summary<W: Write>(
    report: &Report,
    report_dir: &Path,
    conn: &mut W,
) -> Result<(), E> {
    if report.all_headers_unique() {
        writeln!(conn, "All headers are unique within their files.")?;
    } else {
        let mut files: Vec<&str> = report.repetitive_headers.iter().map(|row| row.file_name.as_str()).collect();
        files.dedup();
        writeln!(conn, "Found {} repetitive headers in {} file(s), see {}.",
                 report.repetitive_headers.len(), files.len(), report_dir.join(HEADERS_REPORT).display())?;

        let n_conflicting = report.repetitive_headers.iter().filter(|row| row.has_conflicting_sequences()).count();
        if n_conflicting > 0 {
            writeln!(conn, "{} of the repetitive headers carry more than one distinct sequence.", n_conflicting)?;
        }
    }

    if report.any_orphans() {
        writeln!(conn, "Found {} sequence lines without a header, see {}.",
                 report.orphans.len(), report_dir.join(ORPHANS_LOG).display())?;
    } else {
        writeln!(conn, "All sequences have headers.")?;
    }
    conn.flush()?;

    Ok(())
}
