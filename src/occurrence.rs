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
use indexmap::map::IndexMap;

/// Identifies a header line within a single input file.
///
/// Headers are only compared within the file they appear in, so the same
/// header text in two files gives two distinct keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderKey {
    /// Base name of the file the header was read from.
    pub file_name: String,
    /// Header line including the leading `>`.
    pub header: String,
}

impl HeaderKey {
    pub fn new(
        file_name: &str,
        header: &str,
    ) -> Self {
        HeaderKey{ file_name: file_name.to_string(), header: header.to_string() }
    }
}

/// Everything recorded about one [HeaderKey] during a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccurrenceEntry {
    /// Number of times the header appeared in the file.
    pub count: usize,
    /// 1-based line numbers of each appearance.
    pub line_numbers: Vec<usize>,
    /// Distinct gap-free sequences written under the header, in input order.
    pub sequences: Vec<Vec<u8>>,
}

/// Accumulates header occurrences over every file in a pass.
///
/// Entries are kept in order of first appearance, which is also the order
/// rows appear in the reports.
#[derive(Clone, Debug, Default)]
pub struct Occurrences {
    entries: IndexMap<HeaderKey, OccurrenceEntry>,
}

impl Occurrences {
    pub fn new() -> Self {
        Occurrences::default()
    }

    /// Counts an appearance of `header` in `file_name` at `line_number`.
    ///
    /// Returns the number of times the header has now been seen in the file.
    pub fn record_header(
        &mut self,
        file_name: &str,
        header: &str,
        line_number: usize,
    ) -> usize {
        let entry = self.entries.entry(HeaderKey::new(file_name, header)).or_default();
        entry.count += 1;
        entry.line_numbers.push(line_number);
        entry.count
    }

    /// Records `sequence` under `header` unless an identical one is already there.
    ///
    /// Returns true if the sequence was new for this header in this file.
    pub fn record_sequence(
        &mut self,
        file_name: &str,
        header: &str,
        sequence: &[u8],
    ) -> bool {
        let entry = self.entries.entry(HeaderKey::new(file_name, header)).or_default();
        if entry.sequences.iter().any(|seen| seen == sequence) {
            return false
        }
        entry.sequences.push(sequence.to_vec());
        true
    }

    pub fn get(
        &self,
        file_name: &str,
        header: &str,
    ) -> Option<&OccurrenceEntry> {
        self.entries.get(&HeaderKey::new(file_name, header))
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, HeaderKey, OccurrenceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn record_header_counts_and_lines() {
        use super::Occurrences;

        let mut occurrences = Occurrences::new();
        assert_eq!(occurrences.record_header("a.fasta", ">seq1", 1), 1);
        assert_eq!(occurrences.record_header("a.fasta", ">seq2", 3), 1);
        assert_eq!(occurrences.record_header("a.fasta", ">seq1", 5), 2);

        let got = occurrences.get("a.fasta", ">seq1").unwrap();
        assert_eq!(got.count, 2);
        assert_eq!(got.line_numbers, vec![1, 5]);
        assert_eq!(occurrences.len(), 2);
    }

    #[test]
    fn headers_are_scoped_per_file() {
        use super::Occurrences;

        let mut occurrences = Occurrences::new();
        occurrences.record_header("a.fasta", ">seq1", 1);
        occurrences.record_header("b.fasta", ">seq1", 1);

        assert_eq!(occurrences.get("a.fasta", ">seq1").unwrap().count, 1);
        assert_eq!(occurrences.get("b.fasta", ">seq1").unwrap().count, 1);
        assert!(occurrences.get("c.fasta", ">seq1").is_none());
    }

    #[test]
    fn record_sequence_rejects_exact_repeat() {
        use super::Occurrences;

        let mut occurrences = Occurrences::new();
        occurrences.record_header("a.fasta", ">seq1", 1);
        assert!(occurrences.record_sequence("a.fasta", ">seq1", b"ACGT"));
        assert!(!occurrences.record_sequence("a.fasta", ">seq1", b"ACGT"));
        assert!(occurrences.record_sequence("a.fasta", ">seq1", b"ACGA"));
        assert!(occurrences.record_sequence("b.fasta", ">seq1", b"ACGT"));

        let expected = vec![b"ACGT".to_vec(), b"ACGA".to_vec()];
        assert_eq!(occurrences.get("a.fasta", ">seq1").unwrap().sequences, expected);
    }

    #[test]
    fn iter_keeps_first_appearance_order() {
        use super::Occurrences;

        let mut occurrences = Occurrences::new();
        occurrences.record_header("b.fasta", ">z", 1);
        occurrences.record_header("a.fasta", ">y", 1);
        occurrences.record_header("b.fasta", ">z", 3);

        let got: Vec<String> = occurrences.iter().map(|(key, _)| key.header.clone()).collect();
        assert_eq!(got, vec![">z".to_string(), ">y".to_string()]);
    }
}
