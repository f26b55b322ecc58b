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
use crate::clean::OrphanLine;

use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

type E = Box<dyn std::error::Error>;

/// Format a single orphan line as `<filename>: <line>`
pub fn format_orphan_line<W: Write>(
    orphan: &OrphanLine,
    conn: &mut W,
) -> Result<(), E> {
    let mut formatted: String = String::new();
    formatted += &orphan.file_name;
    formatted += ": ";
    formatted += &orphan.line;
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Appends `orphans` to the log at `path`
///
/// The log is created on the first call. Nothing is written if `orphans` is
/// empty, so the log only exists once an orphan line has been found.
///
pub fn append_orphans(
    orphans: &[OrphanLine],
    path: &Path,
) -> Result<(), E> {
    if orphans.is_empty() {
        return Ok(())
    }
    let f = OpenOptions::new().create(true).append(true).open(path)?;
    let mut conn = BufWriter::new(f);
    for orphan in orphans {
        format_orphan_line(orphan, &mut conn)?;
    }
    conn.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_orphan_line() {
        use super::format_orphan_line;
        use crate::clean::OrphanLine;

        let data = OrphanLine{ file_name: "b.fasta".to_string(), line_number: 1, line: "ACGT".to_string() };
        let expected = b"b.fasta: ACGT\n".to_vec();

        let mut got: Vec<u8> = Vec::new();
        format_orphan_line(&data, &mut got).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn append_orphans() {
        use super::append_orphans;
        use crate::clean::OrphanLine;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orphans.txt");

        append_orphans(&[], &path).unwrap();
        assert!(!path.exists());

        let first = vec![OrphanLine{ file_name: "b.fasta".to_string(), line_number: 1, line: "ACGT".to_string() }];
        let second = vec![OrphanLine{ file_name: "c.fasta".to_string(), line_number: 2, line: "TT-A".to_string() }];
        append_orphans(&first, &path).unwrap();
        append_orphans(&second, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b.fasta: ACGT\nc.fasta: TT-A\n");
    }
}
