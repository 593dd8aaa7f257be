//! Operator-facing summary of a run.

use modbuild_core::fetch::FetchReport;
use modbuild_core::pipeline::RunOutcome;

/// Prompts and problems from the fetch phase, one line each.
pub fn fetch_messages(fetch: &FetchReport) -> Vec<String> {
    let mut lines = Vec::new();
    for m in &fetch.manual {
        lines.push(format!("Download '{}' manually from '{}'.", m.file_name, m.source));
    }
    for (file, sha) in &fetch.unpinned {
        lines.push(format!("For '{}' add '{}' to the configuration file.", file, sha));
    }
    for f in &fetch.failed {
        lines.push(match (&f.actual, &f.reason) {
            (Some(actual), _) => format!(
                "Wrong checksum '{}' for '{}'. Expected '{}'.",
                actual,
                f.path.display(),
                f.expected
            ),
            (None, Some(reason)) => format!("Missing '{}': {}", f.path.display(), reason),
            (None, None) => format!("Missing '{}'.", f.path.display()),
        });
    }
    lines
}

/// Printed as soon as the fetch phase ends, before any build can fail.
pub fn print_fetch(fetch: &FetchReport) {
    for line in fetch_messages(fetch) {
        println!("{}", line);
    }
}

pub fn print_builds(outcome: &RunOutcome) {
    let artifacts = match outcome {
        RunOutcome::Built { artifacts, .. } => artifacts,
        RunOutcome::ChecksumFailure(fetch) => {
            println!("Not building: {} file(s) failed verification.", fetch.failed.len());
            return;
        }
    };
    for artifact in artifacts {
        let r = &artifact.report;
        for file in &r.unsupported {
            println!("ERROR: Can't process file '{}' (no idea which file type)!", file);
        }
        for path in &r.unroutable {
            println!("ERROR: Skipping '{}' (no idea where to move)!", path.display());
        }
        for (file, err) in &r.failed {
            println!("ERROR: '{}' failed: {}", file, err);
        }
        for file in &r.unversioned {
            println!("WARNING: no version found in '{}'.", file);
        }
        println!("Built '{}': {}", artifact.build, artifact.path.display());
    }
}
