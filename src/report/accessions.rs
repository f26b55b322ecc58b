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
use std::io::Write;

use crate::report::RepetitiveAccession;

use csv::WriterBuilder;

type E = Box<dyn std::error::Error>;

/// Column names of the repeated accession ID table.
pub const COLUMNS: [&str; 4] = ["Filename", "Accession ID", "Repetitions", "Headers"];

/// Format a single repeated accession ID as a tab separated record
///
/// Headers are joined with `" | "`.
///
pub fn format_accessions_line<W: Write>(
    row: &RepetitiveAccession,
    conn: &mut csv::Writer<W>,
) -> Result<(), E> {
    let repetitions = row.repetitions.to_string();
    let headers = row.headers.join(" | ");
    conn.write_record([
        row.file_name.as_str(),
        row.accession.as_str(),
        repetitions.as_str(),
        headers.as_str(),
    ])?;
    Ok(())
}

/// Format the repeated accession ID table
pub fn format_accessions_table<W: Write>(
    rows: &[RepetitiveAccession],
    conn: &mut W,
) -> Result<(), E> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(conn);
    writer.write_record(COLUMNS)?;
    for row in rows {
        format_accessions_line(row, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}
