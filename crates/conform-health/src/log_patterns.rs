use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::HealthError;

fn default_categories() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("Errors", vec![r"[fF]ailed", r"[eE]rror", r"^E[0-9]+", r"level=error"]),
        ("Warnings", vec![r"[wW]arn", r"^W[0-9]+", r"level=warn"]),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogPatternTally {
    pub counts: HashMap<String, usize>,
}

struct Category {
    name: String,
    patterns: Vec<Regex>,
}

/// Recursively scans `podlogs/<ns>/<pod>/logs/<container>.txt` files and
/// counts, per category, how many lines match any of that category's
/// regexes (§4.8). A line matching several regexes of the same category
/// still counts once. `categories` overrides the defaults (`Errors`,
/// `Warnings`) when supplied.
pub fn tally_log_patterns(
    run_root: &Path,
    categories: Option<&HashMap<String, Vec<String>>>,
) -> Result<LogPatternTally, HealthError> {
    let compiled = compile_categories(categories)?;
    let podlogs_root = run_root.join("podlogs");
    let mut counts: HashMap<String, usize> = compiled.iter().map(|c| (c.name.clone(), 0)).collect();

    if !podlogs_root.exists() {
        return Ok(LogPatternTally { counts });
    }

    for entry in WalkDir::new(&podlogs_root).into_iter().filter_map(Result::ok) {
        if !is_log_file(entry.path(), &podlogs_root) {
            continue;
        }
        let body = std::fs::read_to_string(entry.path()).map_err(|e| HealthError::Io {
            path: entry.path().display().to_string(),
            source: e,
        })?;
        for line in body.lines() {
            for category in &compiled {
                if category.patterns.iter().any(|re| re.is_match(line)) {
                    *counts.get_mut(&category.name).unwrap() += 1;
                }
            }
        }
    }

    Ok(LogPatternTally { counts })
}

/// Matches `podlogs/<ns>/<pod>/logs/<file>.txt` — exactly four path
/// components below `podlogs/`, the third of which is `logs`.
fn is_log_file(path: &Path, podlogs_root: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(podlogs_root) else {
        return false;
    };
    let parts: Vec<_> = rel.components().collect();
    parts.len() == 4
        && parts[2].as_os_str() == "logs"
        && path.extension().map(|e| e == "txt").unwrap_or(false)
}

fn compile_categories(categories: Option<&HashMap<String, Vec<String>>>) -> Result<Vec<Category>, HealthError> {
    match categories {
        Some(map) => map
            .iter()
            .map(|(name, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).map_err(|source| HealthError::Pattern { pattern: p.clone(), source }))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Category {
                    name: name.clone(),
                    patterns: compiled,
                })
            })
            .collect(),
        None => default_categories()
            .into_iter()
            .map(|(name, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("default log-pattern regex is valid"))
                    .collect();
                Ok(Category {
                    name: name.to_string(),
                    patterns: compiled,
                })
            })
            .collect(),
    }
}
