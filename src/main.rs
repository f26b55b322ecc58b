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

use clap::CommandFactory;
use clap::Parser;
use log::error;

use refclean::normalizer::NormalizerKind;
use refclean::Config;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        // Clean
        Some(cli::Commands::Clean {
            input_dir,
            output_dir,
            report_dir,
            extension,
            normalizer,
            seqkit,
            compress,
            accession_report,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });

            let kind = match normalizer.parse::<NormalizerKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(2);
                },
            };
            let normalizer = refclean::normalizer::from_kind(&kind, seqkit);

            let config = Config {
                input_dir: input_dir.clone(),
                output_dir: output_dir.clone(),
                report_dir: report_dir.clone(),
                extension: extension.clone(),
                compress: *compress,
                accession_report: *accession_report,
            };

            match refclean::process_directory(&config, normalizer.as_ref()) {
                Ok(pass) => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = refclean::report::format_summary(&pass.report, &config.report_dir, &mut stdout) {
                        error!("could not print summary: {}", e);
                    }
                },
                Err(e) => {
                    error!("pass aborted: {}", e);
                    std::process::exit(1);
                },
            }
        },
        None => {
            let _ = cli::Cli::command().print_help();
        },
    }
}
