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

use clap::{Parser, Subcommand};

use refclean::config::DEFAULT_EXTENSION;
use refclean::config::DEFAULT_INPUT_DIR;
use refclean::config::DEFAULT_OUTPUT_DIR;
use refclean::config::DEFAULT_REPORT_DIR;

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Clean a directory of FASTA files and report header anomalies
    Clean {
        // Directory with the input files, normalized in place
        #[arg(short = 'i', long = "input", default_value = DEFAULT_INPUT_DIR, help = "Input directory")]
        input_dir: PathBuf,

        // Directory for the cleaned files
        #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_DIR, help = "Output directory")]
        output_dir: PathBuf,

        // Directory for the reports
        #[arg(short = 'r', long = "reports", default_value = DEFAULT_REPORT_DIR, help = "Report directory")]
        report_dir: PathBuf,

        // Extension of the input files
        #[arg(long = "extension", default_value = DEFAULT_EXTENSION)]
        extension: String,

        // Case normalizer: builtin, seqkit or none
        #[arg(long = "normalizer", default_value = "builtin")]
        normalizer: String,

        // seqkit executable used with --normalizer seqkit
        #[arg(long = "seqkit", default_value = "seqkit")]
        seqkit: PathBuf,

        // Gzip the cleaned files
        #[arg(short = 'c', long = "compress", default_value_t = false)]
        compress: bool,

        // Also report accession IDs repeated within a file
        #[arg(long = "accession-report", default_value_t = false)]
        accession_report: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
