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
use crate::normalizer::Normalize;
use crate::normalizer::NormalizerFailed;

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use log::debug;

type E = Box<dyn std::error::Error>;

/// Runs [seqkit](https://bioinf.shenwei.me/seqkit/) as an external normalizer.
///
/// Equivalent to `seqkit seq -u -w 0 <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct Seqkit {
    /// Path to, or name of, the seqkit executable.
    pub executable: PathBuf,
}

impl Default for Seqkit {
    fn default() -> Self {
        Seqkit{ executable: PathBuf::from("seqkit") }
    }
}

impl Normalize for Seqkit {
    fn normalize(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), E> {
        let tool = self.executable.to_string_lossy().to_string();
        debug!("running {} seq -u -w 0 {} -o {}", tool, input.display(), output.display());

        let status = Command::new(&self.executable)
            .arg("seq")
            .arg("-u")
            .arg("-w")
            .arg("0")
            .arg(input)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| NormalizerFailed{ tool: tool.clone(), reason: format!("could not run: {}", e) })?;

        if !status.success() {
            return Err(Box::new(NormalizerFailed{ tool, reason: format!("{}", status) }))
        }

        Ok(())
    }
}
