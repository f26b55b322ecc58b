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

//! Case normalization run on each input file before it is cleaned.
//!
//! A normalizer takes a FASTA file and writes an equivalent file where the
//! sequence letters are uppercase and every record has its sequence on a
//! single line. The following implementations are provided:
//!
//!   - [Builtin](builtin::Builtin): in-process, line based.
//!   - [Seqkit](seqkit::Seqkit): runs `seqkit seq -u -w 0`.
//!   - [Passthrough]: copies the file unchanged.
//!
//! Any closure with the signature `Fn(&Path, &Path) -> Result<(), E>` also
//! implements [Normalize], which is useful for injecting fixtures in tests.
//!
//! Use [normalize_in_place] to run a normalizer on a file through a
//! temporary intermediate that is always removed.
//!

pub mod builtin;
pub mod seqkit;

use std::path::Path;
use std::path::PathBuf;

use log::debug;

type E = Box<dyn std::error::Error>;

/// A normalizer could not produce its output.
#[derive(Debug, Clone)]
pub struct NormalizerFailed {
    pub tool: String,
    pub reason: String,
}

impl std::fmt::Display for NormalizerFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "normalizer '{}' failed: {}", self.tool, self.reason)
    }
}

impl std::error::Error for NormalizerFailed {}

/// Uppercases and unwraps the sequences of a FASTA file.
pub trait Normalize {
    /// Reads `input` and writes the normalized contents to `output`.
    ///
    /// `output` already exists and is empty when this is called.
    fn normalize(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), E>;
}

impl<F> Normalize for F
where
    F: Fn(&Path, &Path) -> Result<(), E>,
{
    fn normalize(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), E> {
        self(input, output)
    }
}

/// Leaves the contents unchanged.
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

impl Normalize for Passthrough {
    fn normalize(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), E> {
        std::fs::copy(input, output)?;
        Ok(())
    }
}

/// Supported normalizers.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NormalizerKind {
    #[default]
    Builtin,
    Seqkit,
    None,
}

impl std::str::FromStr for NormalizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(NormalizerKind::Builtin),
            "seqkit" => Ok(NormalizerKind::Seqkit),
            "none" => Ok(NormalizerKind::None),
            _ => Err(format!("'{}' is not a valid NormalizerKind", s)),
        }
    }
}

/// Creates the normalizer selected by `kind`.
///
/// `seqkit` is the executable used by [NormalizerKind::Seqkit].
pub fn from_kind(
    kind: &NormalizerKind,
    seqkit: &Path,
) -> Box<dyn Normalize> {
    match kind {
        NormalizerKind::Builtin => Box::new(builtin::Builtin),
        NormalizerKind::Seqkit => Box::new(seqkit::Seqkit{ executable: PathBuf::from(seqkit) }),
        NormalizerKind::None => Box::new(Passthrough),
    }
}

/// Normalize the file at `path` in place.
///
/// The normalizer writes to a temporary file next to `path`. On success the
/// temporary file takes the permissions of `path` and is renamed over it. On
/// failure the temporary file is deleted and `path` is left as it was.
///
pub fn normalize_in_place<N: Normalize + ?Sized>(
    normalizer: &N,
    path: &Path,
) -> Result<(), E> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = tempfile::Builder::new()
        .prefix(".refclean-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    debug!("normalizing {} via {}", path.display(), tmp.path().display());

    normalizer.normalize(path, tmp.path())?;

    let permissions = std::fs::metadata(path)?.permissions();
    std::fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path)?;

    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn normalizer_kind_from_str() {
        use super::NormalizerKind;
        use std::str::FromStr;

        assert_eq!(NormalizerKind::from_str("builtin").unwrap(), NormalizerKind::Builtin);
        assert_eq!(NormalizerKind::from_str("seqkit").unwrap(), NormalizerKind::Seqkit);
        assert_eq!(NormalizerKind::from_str("none").unwrap(), NormalizerKind::None);
        assert!(NormalizerKind::from_str("SeqKit").is_err());
    }

    #[test]
    fn normalize_in_place_replaces_file() {
        use super::normalize_in_place;
        use std::path::Path;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.fasta");
        std::fs::write(&path, b">seq1\nac\ngt\n").unwrap();

        let upper = |input: &Path, output: &Path| -> Result<(), Box<dyn std::error::Error>> {
            let contents = std::fs::read_to_string(input)?;
            std::fs::write(output, contents.to_uppercase())?;
            Ok(())
        };
        normalize_in_place(&upper, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), ">SEQ1\nAC\nGT\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn normalize_in_place_removes_intermediate_on_failure() {
        use super::normalize_in_place;
        use super::NormalizerFailed;
        use std::path::Path;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.fasta");
        std::fs::write(&path, b">seq1\nac\n").unwrap();

        let failing = |_input: &Path, output: &Path| -> Result<(), Box<dyn std::error::Error>> {
            std::fs::write(output, b"partial")?;
            Err(Box::new(NormalizerFailed{ tool: "mock".to_string(), reason: "exit status 2".to_string() }))
        };
        let got = normalize_in_place(&failing, &path);

        assert!(got.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ">seq1\nac\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn passthrough_keeps_contents() {
        use super::normalize_in_place;
        use super::Passthrough;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.fasta");
        std::fs::write(&path, b"acgt\n>seq1\nac-\ngt\n").unwrap();

        normalize_in_place(&Passthrough, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "acgt\n>seq1\nac-\ngt\n");
    }
}
