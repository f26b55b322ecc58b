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

use crate::report::RepetitiveHeader;

use csv::WriterBuilder;

type E = Box<dyn std::error::Error>;

/// Column names of the repetitive header table.
pub const COLUMNS: [&str; 4] = ["Filename", "Header", "Repetitions", "Line Numbers"];

/// Format a single repetitive header as a tab separated record
///
/// Line numbers are joined with `", "`. Fields that contain a tab, a quote
/// or a line break are quoted.
///
pub fn format_headers_line<W: Write>(
    row: &RepetitiveHeader,
    conn: &mut csv::Writer<W>,
) -> Result<(), E> {
    let repetitions = row.repetitions.to_string();
    let line_numbers = row.line_numbers.iter().map(|x| x.to_string()).collect::<Vec<String>>().join(", ");
    conn.write_record([
        row.file_name.as_str(),
        row.header.as_str(),
        repetitions.as_str(),
        line_numbers.as_str(),
    ])?;
    Ok(())
}

/// Format the repetitive header table
///
/// Writes the column names followed by one line per row in `rows`.
///
pub fn format_headers_table<W: Write>(
    rows: &[RepetitiveHeader],
    conn: &mut W,
) -> Result<(), E> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(conn);
    writer.write_record(COLUMNS)?;
    for row in rows {
        format_headers_line(row, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}
