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
use std::path::PathBuf;

type E = Box<dyn std::error::Error>;

pub const DEFAULT_INPUT_DIR: &str = "./preprocessed_fasta";
pub const DEFAULT_OUTPUT_DIR: &str = "./final_fasta";
pub const DEFAULT_REPORT_DIR: &str = "./reports";
pub const DEFAULT_EXTENSION: &str = "fasta";

#[derive(Debug, Clone)]
pub struct InvalidConfig {
    pub reason: String,
}

impl std::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "invalid configuration: {}", self.reason)
    }
}

impl std::error::Error for InvalidConfig {}

/// Settings for a pass over a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory with the input files. Inputs are normalized in place.
    pub input_dir: PathBuf,
    /// Directory for the cleaned files.
    pub output_dir: PathBuf,
    /// Directory for the report tables and the orphan log.
    pub report_dir: PathBuf,
    /// Extension of the files to process, without the leading dot.
    pub extension: String,
    /// Gzip the cleaned files and append `.gz` to their names.
    pub compress: bool,
    /// Also write the repeated accession ID table.
    pub accession_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config{
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            compress: false,
            accession_report: false,
        }
    }
}

impl Config {
    /// Checks that the settings can be used for a pass.
    pub fn validate(&self) -> Result<(), E> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(Box::new(InvalidConfig{ reason: format!("extension '{}' must be non-empty and not start with '.'", self.extension) }))
        }
        Ok(())
    }
}
