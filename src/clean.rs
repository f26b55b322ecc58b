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

//! Gap removal and duplicate suppression for a single FASTA file.
//!
//! The input is expected to have been through a [Normalize](crate::normalizer::Normalize)
//! implementation first, so that every record has its sequence on one line.
//! Wrapped input is still handled by joining the sequence lines of a record.

use crate::occurrence::Occurrences;

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use bstr::ByteSlice;
use log::debug;
use log::warn;

type E = Box<dyn std::error::Error>;

/// Marks the start of a header line.
pub const HEADER_MARKER: u8 = b'>';

/// Alignment gap symbol removed from sequences.
pub const GAP: u8 = b'-';

/// A sequence line that appeared before the first header of a file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrphanLine {
    pub file_name: String,
    /// 1-based line number in the normalized file.
    pub line_number: usize,
    /// The line as read, without the line ending.
    pub line: String,
}

/// What happened while cleaning one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// Header lines seen.
    pub records_read: usize,
    /// Records written to the cleaned output.
    pub records_written: usize,
    /// Records with the same header and sequence as an earlier one.
    pub duplicates_dropped: usize,
    /// Headers with nothing left in their sequence once gaps are removed.
    pub empty_records: usize,
    pub orphans: Vec<OrphanLine>,
}

struct OpenRecord {
    header: Vec<u8>,
    name: String,
    sequence: Vec<u8>,
}

/// Removes gap symbols and whitespace from a sequence line.
///
/// Every other byte is kept as is.
///
pub fn strip_gaps(
    line: &[u8],
) -> Vec<u8> {
    line.iter().copied().filter(|b| *b != GAP && !b.is_ascii_whitespace()).collect()
}

/// Clean FASTA data from [Read] and write the result to [Write].
///
/// Header occurrences are counted in `occurrences` under `file_name`. A
/// record is written only if its gap-free sequence is not empty and its
/// header has not already been written with the same sequence in this file.
/// Lines before the first header are returned as [OrphanLine]s and are not
/// written.
///
/// Leading whitespace before the `>` of a header is removed. Bytes that are
/// not valid UTF-8 are written unchanged.
///
/// Returns the counts for this file.
///
pub fn clean_from_read_to_write<R: Read, W: Write>(
    file_name: &str,
    occurrences: &mut Occurrences,
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<FileOutcome, E> {
    let mut reader = BufReader::new(conn_in);
    let mut outcome = FileOutcome::default();
    let mut current: Option<OpenRecord> = None;

    let mut buf: Vec<u8> = Vec::new();
    let mut line_number: usize = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let line = buf.trim_end_with(|c| c == '\n' || c == '\r');
        let unindented = line.trim_start();

        if unindented.first() == Some(&HEADER_MARKER) {
            if let Some(record) = current.take() {
                close_record(file_name, record, occurrences, conn_out, &mut outcome)?;
            }
            if unindented.len() != line.len() {
                warn!("{}: line {} has whitespace before the header marker", file_name, line_number);
            }
            let header = unindented.trim_end();
            let name = header.to_str_lossy().into_owned();
            occurrences.record_header(file_name, &name, line_number);
            outcome.records_read += 1;
            current = Some(OpenRecord{ header: header.to_vec(), name, sequence: Vec::new() });
        } else if unindented.trim_end().is_empty() {
            continue;
        } else if let Some(record) = current.as_mut() {
            record.sequence.extend(strip_gaps(line));
        } else {
            warn!("{}: line {} has sequence data before any header", file_name, line_number);
            outcome.orphans.push(OrphanLine{ file_name: file_name.to_string(), line_number, line: line.to_str_lossy().into_owned() });
        }
    }

    if let Some(record) = current.take() {
        close_record(file_name, record, occurrences, conn_out, &mut outcome)?;
    }
    conn_out.flush()?;

    Ok(outcome)
}

fn close_record<W: Write>(
    file_name: &str,
    record: OpenRecord,
    occurrences: &mut Occurrences,
    conn_out: &mut W,
    outcome: &mut FileOutcome,
) -> Result<(), E> {
    if record.sequence.is_empty() {
        debug!("{}: {} has no sequence", file_name, record.name);
        outcome.empty_records += 1;
        return Ok(())
    }

    if !occurrences.record_sequence(file_name, &record.name, &record.sequence) {
        debug!("{}: dropping repeated record {}", file_name, record.name);
        outcome.duplicates_dropped += 1;
        return Ok(())
    }

    let n_distinct = occurrences.get(file_name, &record.name).map_or(0, |entry| entry.sequences.len());
    if n_distinct > 1 {
        warn!("{}: {} appears with {} different sequences", file_name, record.name, n_distinct);
    }

    let mut formatted: Vec<u8> = Vec::with_capacity(record.header.len() + record.sequence.len() + 2);
    formatted.extend_from_slice(&record.header);
    formatted.push(b'\n');
    formatted.extend_from_slice(&record.sequence);
    formatted.push(b'\n');
    conn_out.write_all(&formatted)?;
    outcome.records_written += 1;

    Ok(())
}
