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
use crate::clean::HEADER_MARKER;
use crate::normalizer::Normalize;

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use bstr::ByteSlice;

type E = Box<dyn std::error::Error>;

/// In-process normalizer.
///
/// See [normalize_from_read_to_write] for the rules applied.
#[derive(Debug, Clone, Default)]
pub struct Builtin;

impl Normalize for Builtin {
    fn normalize(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), E> {
        let mut conn_in = File::open(input)?;
        let mut conn_out = BufWriter::new(File::create(output)?);
        normalize_from_read_to_write(&mut conn_in, &mut conn_out)?;
        Ok(())
    }
}

/// Normalize FASTA data from [Read] and write it to [Write].
///
/// - Header lines are copied without their line ending.
/// - Sequence lines of a record are trimmed, uppercased and joined into one line.
/// - Blank lines inside a record are dropped.
/// - Lines before the first header are copied unchanged.
///
/// Only ASCII letters change case, other bytes are copied as is. Output
/// lines end in `\n`.
///
pub fn normalize_from_read_to_write<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<(), E> {
    let mut reader = BufReader::new(conn_in);
    let mut in_record = false;
    let mut sequence: Vec<u8> = Vec::new();

    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_with(|c| c == '\n' || c == '\r');
        let trimmed = line.trim();

        if trimmed.first() == Some(&HEADER_MARKER) {
            if !sequence.is_empty() {
                write_line(&sequence, conn_out)?;
                sequence.clear();
            }
            write_line(line, conn_out)?;
            in_record = true;
        } else if !in_record {
            write_line(line, conn_out)?;
        } else if !trimmed.is_empty() {
            sequence.extend(trimmed.to_ascii_uppercase());
        }
    }

    if !sequence.is_empty() {
        write_line(&sequence, conn_out)?;
    }
    conn_out.flush()?;

    Ok(())
}

fn write_line<W: Write>(
    line: &[u8],
    conn: &mut W,
) -> Result<(), E> {
    conn.write_all(line)?;
    conn.write_all(b"\n")?;
    Ok(())
}
