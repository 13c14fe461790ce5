//! Batch analysis: load and decode class files on a worker pool, then feed
//! the results into a single [`Analyzer`] in input order.

use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::catalog::{ClassInput, LoadedInput, load_inputs};
use crate::package::JavaClass;
use crate::parse::{ClassFileParser, ParsedClass};
use crate::scan::FileManager;

pub use crate::catalog::Failure;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisOutcome {
    pub classes_parsed: usize,
    pub classes_skipped: usize,
    pub failures: Vec<Failure>,
    pub duration_ms: u64,
}

enum Decoded {
    Class(ParsedClass),
    Failed(Failure),
}

/// Decodes every class reachable from `files` and adds it to `analyzer`.
pub fn analyze(
    files: &FileManager,
    parser: &ClassFileParser,
    analyzer: &mut Analyzer,
) -> anyhow::Result<AnalysisOutcome> {
    let start = Instant::now();
    let paths = files.extract_files()?;
    info!(files = paths.len(), "analyzing");

    let decoded: Vec<Decoded> = paths
        .par_iter()
        .flat_map_iter(|path| decode_path(path, files, parser))
        .collect();

    let mut outcome = AnalysisOutcome::default();
    for item in decoded {
        match item {
            Decoded::Class(class) => {
                if analyzer.analyze_class(JavaClass::from(class)) {
                    outcome.classes_parsed += 1;
                } else {
                    outcome.classes_skipped += 1;
                }
            }
            Decoded::Failed(failure) => outcome.failures.push(failure),
        }
    }

    outcome.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        parsed = outcome.classes_parsed,
        skipped = outcome.classes_skipped,
        failed = outcome.failures.len(),
        packages = analyzer.graph().len(),
        duration_ms = outcome.duration_ms,
        "analysis finished"
    );
    Ok(outcome)
}

fn decode_path(path: &Path, files: &FileManager, parser: &ClassFileParser) -> Vec<Decoded> {
    match load_inputs(path, files) {
        Ok(inputs) => inputs
            .into_par_iter()
            .map(|input: LoadedInput| match input {
                Ok(input) => decode(&input, parser),
                Err(failure) => {
                    warn!(origin = %failure.origin, error = %failure.message, "failed to read entry");
                    Decoded::Failed(failure)
                }
            })
            .collect(),
        Err(e) => {
            let failure = Failure {
                origin: path.display().to_string(),
                message: format!("{e:#}"),
            };
            warn!(origin = %failure.origin, error = %failure.message, "failed to load");
            vec![Decoded::Failed(failure)]
        }
    }
}

fn decode(input: &ClassInput, parser: &ClassFileParser) -> Decoded {
    match parser.parse_named(&input.origin, &input.bytes) {
        Ok(class) => Decoded::Class(class),
        Err(e) => {
            warn!(origin = %input.origin, error = %e, "failed to decode class file");
            Decoded::Failed(Failure {
                origin: input.origin.clone(),
                message: e.to_string(),
            })
        }
    }
}
