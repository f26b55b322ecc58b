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

//! refclean is a library and a command-line client for curating FASTA
//! reference sequence databases. For every FASTA file in a directory it:
//!
//!   - Uppercases and unwraps the sequences with a [normalizer].
//!   - Removes `-` gap symbols from the sequences.
//!   - Drops records that repeat both the header and the sequence of an
//!     earlier record in the same file.
//!   - Counts how often each header appears and on which lines.
//!   - Collects sequence lines that appear before the first header.
//!
//! The counts from all files are turned into a [Report](report::Report)
//! listing the headers that are not unique within their file and the
//! sequence lines without a header. Neither is treated as an error.
//!
//! ## Usage
//!
//! ### Command line
//!
//! `refclean clean` runs a pass with the defaults from [config]:
//!
//! ```text
//! refclean clean --input ./preprocessed_fasta --output ./final_fasta --reports ./reports
//! ```
//!
//! The pass writes, only when there is something to report:
//!
//!   - `repetitive_headers_report.tsv`: Filename, Header, Repetitions, Line Numbers.
//!   - `sequences_without_headers.txt`: one `<filename>: <line>` per orphan line.
//!   - `duplicate_accession_ids_report.tsv` with `--accession-report`.
//!
//! ### Rust API
//!
//! [process_directory] runs a full pass. [process_file] cleans one file and
//! adds its headers to an [Occurrences] accumulator.
//! [clean_from_read_to_write] does the same on anything implementing
//! [Read](std::io::Read) and [Write].
//!
//! ```rust
//! use refclean::clean_from_read_to_write;
//! use refclean::occurrence::Occurrences;
//! use refclean::report::build_report;
//! use std::io::Cursor;
//!
//! let mut input = Cursor::new(b">seq1\nAC-GT\n>seq1\nAC-GT\n>seq2\nTTTT\n".to_vec());
//! let mut output: Vec<u8> = Vec::new();
//! let mut occurrences = Occurrences::new();
//!
//! let outcome = clean_from_read_to_write("a.fasta", &mut occurrences, &mut input, &mut output).unwrap();
//! assert_eq!(output, b">seq1\nACGT\n>seq2\nTTTT\n".to_vec());
//!
//! let report = build_report(&occurrences, outcome.orphans);
//! assert!(!report.all_headers_unique());
//! assert_eq!(report.repetitive_headers[0].line_numbers, vec![1, 3]);
//! ```
//!

use normalizer::normalize_in_place;
use normalizer::Normalize;
use report::build_report;
use report::orphans::append_orphans;
use report::remove_stale_reports;
use report::write_report_tables;
use report::Report;
use report::ORPHANS_LOG;

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use log::info;
use log::warn;

pub mod clean;
pub mod config;
pub mod normalizer;
pub mod occurrence;
pub mod report;

pub use clean::clean_from_read_to_write;
pub use clean::FileOutcome;
pub use config::Config;
pub use occurrence::Occurrences;

type E = Box<dyn std::error::Error>;

/// A file cleaned during a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub file_name: String,
    pub output: PathBuf,
    pub outcome: FileOutcome,
}

/// Result of [process_directory].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pass {
    pub report: Report,
    /// Cleaned files in processing order.
    pub files: Vec<FileSummary>,
    /// Report tables written to the report directory.
    pub tables: Vec<PathBuf>,
}

/// Lists the files in `dir` with extension `extension`, sorted by name.
///
/// Directories and files with other extensions are skipped.
pub fn list_inputs(
    dir: &Path,
    extension: &str,
) -> Result<Vec<PathBuf>, E> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file() && path.extension().is_some_and(|ext| ext == extension);
        if matches {
            inputs.push(path);
        } else {
            debug!("skipping {}", path.display());
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Returns where the cleaned version of `file_name` is written.
pub fn output_path(
    output_dir: &Path,
    file_name: &str,
    compress: bool,
) -> PathBuf {
    if compress {
        output_dir.join(file_name.to_string() + ".gz")
    } else {
        output_dir.join(file_name)
    }
}

/// Normalize, clean and write a single file.
///
/// `input` is normalized in place with `normalizer` and then cleaned into
/// `output`. Headers are counted in `occurrences` under the base name of
/// `input`.
///
/// The cleaned data goes to a temporary file in the directory of `output`
/// that is renamed to `output` once complete, so `input` and `output` may be
/// the same path.
///
/// ## Errors
///
/// Returns an error if the normalizer fails or if reading or writing fails.
/// `output` is not created or changed in that case.
///
pub fn process_file<N: Normalize + ?Sized>(
    input: &Path,
    output: &Path,
    normalizer: &N,
    occurrences: &mut Occurrences,
    compress: bool,
) -> Result<FileOutcome, E> {
    let file_name = input.file_name().map(|x| x.to_string_lossy().to_string()).unwrap_or_default();

    normalize_in_place(normalizer, input)?;

    let out_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".refclean-")
        .suffix(".tmp")
        .tempfile_in(out_dir)?;

    let mut conn_in = File::open(input)?;
    let outcome = if compress {
        let mut conn_out = GzEncoder::new(BufWriter::new(tmp.reopen()?), Compression::default());
        let outcome = clean_from_read_to_write(&file_name, occurrences, &mut conn_in, &mut conn_out)?;
        conn_out.finish()?.flush()?;
        outcome
    } else {
        let mut conn_out = BufWriter::new(tmp.reopen()?);
        let outcome = clean_from_read_to_write(&file_name, occurrences, &mut conn_in, &mut conn_out)?;
        conn_out.flush()?;
        outcome
    };

    let permissions = std::fs::metadata(input)?.permissions();
    std::fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(output)?;

    Ok(outcome)
}

/// Run a full pass over the input directory of `config`.
///
/// Creates missing directories and removes report files from an earlier pass
/// before processing the inputs in name order. Orphan lines are appended to
/// the orphan log as each file finishes. The report tables are written at the
/// end of the pass.
///
/// ## Errors
///
/// The first I/O error or normalizer failure stops the pass and is returned.
/// Files processed before the failure keep their cleaned outputs, and the
/// orphan log has their orphan lines. No report tables are written.
///
/// Repetitive headers and orphan lines are never errors, they are returned in
/// [Pass::report].
///
pub fn process_directory<N: Normalize + ?Sized>(
    config: &Config,
    normalizer: &N,
) -> Result<Pass, E> {
    config.validate()?;

    for dir in [&config.input_dir, &config.output_dir, &config.report_dir] {
        std::fs::create_dir_all(dir)?;
    }
    remove_stale_reports(&config.report_dir)?;

    let inputs = list_inputs(&config.input_dir, &config.extension)?;
    if inputs.is_empty() {
        warn!("no .{} files in {}", config.extension, config.input_dir.display());
    }

    let orphan_log = config.report_dir.join(ORPHANS_LOG);
    let mut occurrences = Occurrences::new();
    let mut orphans = Vec::new();
    let mut files: Vec<FileSummary> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let file_name = input.file_name().map(|x| x.to_string_lossy().to_string()).unwrap_or_default();
        let output = output_path(&config.output_dir, &file_name, config.compress);
        info!("cleaning {} into {}", input.display(), output.display());

        let outcome = process_file(&input, &output, normalizer, &mut occurrences, config.compress)?;
        append_orphans(&outcome.orphans, &orphan_log)?;
        info!("{}: wrote {} of {} records, dropped {} repeated and {} empty",
              file_name, outcome.records_written, outcome.records_read, outcome.duplicates_dropped, outcome.empty_records);

        orphans.extend(outcome.orphans.iter().cloned());
        files.push(FileSummary{ file_name, output, outcome });
    }

    let report = build_report(&occurrences, orphans);
    let tables = write_report_tables(&report, &config.report_dir, config.accession_report)?;

    Ok(Pass{ report, files, tables })
}

// Tests
#[cfg(test)]
mod tests {

    fn test_config(root: &std::path::Path) -> crate::Config {
        crate::Config{
            input_dir: root.join("in"),
            output_dir: root.join("out"),
            report_dir: root.join("reports"),
            ..Default::default()
        }
    }

    #[test]
    fn process_directory_repeated_and_orphans() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;
        use crate::report::HEADERS_REPORT;
        use crate::report::ORPHANS_LOG;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nAC-GT\n>seq1\nAC-GT\n>seq2\nTTTT\n").unwrap();
        std::fs::write(config.input_dir.join("b.fasta"), b"ACGT\n>seq1\nACGT\n").unwrap();

        let pass = process_directory(&config, &Builtin).unwrap();

        assert!(!pass.report.all_headers_unique());
        assert!(pass.report.any_orphans());
        assert_eq!(pass.files.len(), 2);
        assert_eq!(pass.tables, vec![config.report_dir.join(HEADERS_REPORT)]);

        assert_eq!(std::fs::read_to_string(config.output_dir.join("a.fasta")).unwrap(), ">seq1\nACGT\n>seq2\nTTTT\n");
        assert_eq!(std::fs::read_to_string(config.output_dir.join("b.fasta")).unwrap(), ">seq1\nACGT\n");
        assert_eq!(std::fs::read_to_string(config.report_dir.join(HEADERS_REPORT)).unwrap(),
                   "Filename\tHeader\tRepetitions\tLine Numbers\na.fasta\t>seq1\t2\t1, 3\n");
        assert_eq!(std::fs::read_to_string(config.report_dir.join(ORPHANS_LOG)).unwrap(), "b.fasta: ACGT\n");
    }

    #[test]
    fn process_directory_unique_headers() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nacgt\nac\n>seq2\nTT-TT\n").unwrap();
        std::fs::write(config.input_dir.join("b.fasta"), b">seq1\nACGT\n").unwrap();

        let pass = process_directory(&config, &Builtin).unwrap();

        assert!(pass.report.all_headers_unique());
        assert!(!pass.report.any_orphans());
        assert!(pass.tables.is_empty());
        assert_eq!(std::fs::read_dir(&config.report_dir).unwrap().count(), 0);

        // inputs are normalized in place
        assert_eq!(std::fs::read_to_string(config.input_dir.join("a.fasta")).unwrap(), ">seq1\nACGTAC\n>seq2\nTT-TT\n");
        assert_eq!(std::fs::read_to_string(config.output_dir.join("a.fasta")).unwrap(), ">seq1\nACGTAC\n>seq2\nTTTT\n");
    }

    #[test]
    fn process_directory_creates_missing_directories() {
        use super::process_directory;
        use crate::normalizer::Passthrough;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let pass = process_directory(&config, &Passthrough).unwrap();

        assert!(pass.files.is_empty());
        assert!(config.input_dir.is_dir());
        assert!(config.output_dir.is_dir());
        assert!(config.report_dir.is_dir());
    }

    #[test]
    fn process_directory_skips_other_extensions() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(config.input_dir.join("nested.fasta")).unwrap();
        std::fs::write(config.input_dir.join("notes.txt"), b"acgt\n").unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nacgt\n").unwrap();

        let pass = process_directory(&config, &Builtin).unwrap();

        assert_eq!(pass.files.len(), 1);
        assert_eq!(pass.files[0].file_name, "a.fasta");
        assert_eq!(std::fs::read_to_string(config.input_dir.join("notes.txt")).unwrap(), "acgt\n");
        assert!(!config.output_dir.join("notes.txt").exists());
    }

    #[test]
    fn process_directory_is_idempotent() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;
        use crate::Config;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nac-gt\n>seq1\nACGT\n>seq2\nt-t\n").unwrap();
        process_directory(&config, &Builtin).unwrap();

        let second = Config{
            input_dir: config.output_dir.clone(),
            output_dir: dir.path().join("out2"),
            ..config.clone()
        };
        process_directory(&second, &Builtin).unwrap();

        let first_bytes = std::fs::read(config.output_dir.join("a.fasta")).unwrap();
        let second_bytes = std::fs::read(second.output_dir.join("a.fasta")).unwrap();
        assert_eq!(first_bytes, b">seq1\nACGT\n>seq2\nTT\n".to_vec());
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn process_directory_same_input_and_output() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;
        use crate::Config;

        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("fasta");
        let config = Config{
            input_dir: shared.clone(),
            output_dir: shared.clone(),
            report_dir: dir.path().join("reports"),
            ..Default::default()
        };
        std::fs::create_dir_all(&shared).unwrap();
        std::fs::write(shared.join("a.fasta"), b">seq1\nAC-GT\n>seq1\nAC-GT\n").unwrap();

        process_directory(&config, &Builtin).unwrap();

        assert_eq!(std::fs::read_to_string(shared.join("a.fasta")).unwrap(), ">seq1\nACGT\n");
        assert_eq!(std::fs::read_dir(&shared).unwrap().count(), 1);
    }

    #[test]
    fn process_directory_compressed_output() {
        use super::process_directory;
        use crate::normalizer::builtin::Builtin;
        use crate::Config;
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let config = Config{ compress: true, ..test_config(dir.path()) };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nAC-GT\n>seq2\nTTTT\n").unwrap();

        let pass = process_directory(&config, &Builtin).unwrap();
        assert_eq!(pass.files[0].output, config.output_dir.join("a.fasta.gz"));

        let f = std::fs::File::open(config.output_dir.join("a.fasta.gz")).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(f);
        let mut got = String::new();
        decoder.read_to_string(&mut got).unwrap();

        assert_eq!(got, ">seq1\nACGT\n>seq2\nTTTT\n");
    }

    #[test]
    fn process_directory_accession_report() {
        use super::process_directory;
        use crate::normalizer::Passthrough;
        use crate::report::ACCESSIONS_REPORT;
        use crate::Config;

        let dir = tempfile::tempdir().unwrap();
        let config = Config{ accession_report: true, ..test_config(dir.path()) };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("ITS.fasta"), b">EUK1;Fungi\nACGT\n>EUK1;Fungi;Ascomycota\nACGA\n").unwrap();

        let pass = process_directory(&config, &Passthrough).unwrap();

        assert!(pass.report.all_headers_unique());
        assert_eq!(pass.tables, vec![config.report_dir.join(ACCESSIONS_REPORT)]);
        assert_eq!(std::fs::read_to_string(config.report_dir.join(ACCESSIONS_REPORT)).unwrap(),
                   "Filename\tAccession ID\tRepetitions\tHeaders\nITS.fasta\tEUK1\t2\t>EUK1;Fungi | >EUK1;Fungi;Ascomycota\n");
    }

    #[test]
    fn process_directory_removes_stale_reports() {
        use super::process_directory;
        use crate::normalizer::Passthrough;
        use crate::report::HEADERS_REPORT;
        use crate::report::ORPHANS_LOG;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::create_dir_all(&config.report_dir).unwrap();
        std::fs::write(config.report_dir.join(HEADERS_REPORT), b"stale").unwrap();
        std::fs::write(config.report_dir.join(ORPHANS_LOG), b"stale").unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b"ACGT\n>seq1\nACGT\n").unwrap();

        process_directory(&config, &Passthrough).unwrap();

        assert!(!config.report_dir.join(HEADERS_REPORT).exists());
        assert_eq!(std::fs::read_to_string(config.report_dir.join(ORPHANS_LOG)).unwrap(), "a.fasta: ACGT\n");
    }

    #[test]
    fn normalizer_failure_aborts_pass() {
        use super::process_directory;
        use crate::normalizer::NormalizerFailed;
        use std::path::Path;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nACGT\n").unwrap();
        std::fs::write(config.input_dir.join("b.fasta"), b">seq1\nACGT\n>seq1\nACGT\n").unwrap();
        std::fs::write(config.input_dir.join("c.fasta"), b">seq1\nACGT\n").unwrap();

        let fails_on_b = |input: &Path, output: &Path| -> Result<(), Box<dyn std::error::Error>> {
            std::fs::copy(input, output)?;
            if input.ends_with("b.fasta") {
                return Err(Box::new(NormalizerFailed{ tool: "mock".to_string(), reason: "exit status: 1".to_string() }))
            }
            Ok(())
        };
        let got = process_directory(&config, &fails_on_b);

        assert!(got.is_err());
        assert!(config.output_dir.join("a.fasta").exists());
        assert!(!config.output_dir.join("b.fasta").exists());
        assert!(!config.output_dir.join("c.fasta").exists());
        assert_eq!(std::fs::read_dir(&config.input_dir).unwrap().count(), 3);
        assert_eq!(std::fs::read_dir(&config.report_dir).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_output_aborts_pass() {
        use super::process_directory;
        use crate::normalizer::Passthrough;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("a.fasta"), b">seq1\nACGT\n").unwrap();
        std::fs::write(&config.output_dir, b"not a directory").unwrap();

        let got = process_directory(&config, &Passthrough);

        assert!(got.is_err());
    }

    #[test]
    fn process_file_counts_into_shared_occurrences() {
        use super::process_file;
        use crate::normalizer::Passthrough;
        use crate::occurrence::Occurrences;

        let dir = tempfile::tempdir().unwrap();
        let input_a = dir.path().join("a.fasta");
        let input_b = dir.path().join("b.fasta");
        std::fs::write(&input_a, b">seq1\nACGT\n").unwrap();
        std::fs::write(&input_b, b">seq1\nACGT\n>seq1\nACGT\n").unwrap();

        let mut occurrences = Occurrences::new();
        process_file(&input_a, &dir.path().join("a.out"), &Passthrough, &mut occurrences, false).unwrap();
        let outcome = process_file(&input_b, &dir.path().join("b.out"), &Passthrough, &mut occurrences, false).unwrap();

        assert_eq!(outcome.duplicates_dropped, 1);
        assert_eq!(occurrences.get("a.fasta", ">seq1").unwrap().count, 1);
        assert_eq!(occurrences.get("b.fasta", ">seq1").unwrap().line_numbers, vec![1, 3]);
    }
}
