use crate::collision::{resolve_collisions_counted, RenamePair};
use crate::date_format::CompiledDatePattern;
use crate::normalize::{rewrite_date, NormalizeOptions};
use crate::pattern::{apply_rules, PatternRule};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What produces the new name of each file.
#[derive(Debug, Clone)]
pub enum RenameRule {
    Pattern(PatternRule),
    Patterns(Vec<PatternRule>),
    Date {
        pattern: CompiledDatePattern,
        options: NormalizeOptions,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RenameStats {
    pub inputs: usize,
    pub unchanged: usize,
    pub no_date_match: usize,
    pub collisions_resolved: usize,
    pub planned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub pairs: Vec<RenamePair>,
    pub stats: RenameStats,
}

/// Computes the rename pairs for `files` and resolves target collisions.
///
/// Rules see only the final path component; the directory part is kept.
pub fn generate_plan(files: &[String], rule: &RenameRule) -> Result<RenamePlan> {
    if let RenameRule::Date { options, .. } = rule {
        options.century.validate()?;
    }

    let mut stats = RenameStats {
        inputs: files.len(),
        ..RenameStats::default()
    };

    let mut raw_pairs = Vec::with_capacity(files.len());
    for file in files {
        let (dir, name) = split_file_name(file);
        let renamed = match rule {
            RenameRule::Pattern(rule) => rule.apply(name),
            RenameRule::Patterns(rules) => apply_rules(rules, name),
            RenameRule::Date { pattern, options } => {
                match rewrite_date(name, pattern, options)? {
                    Some(renamed) => renamed,
                    None => {
                        warn!(file = %file, mode = pattern.mode(), "no date match found");
                        stats.no_date_match += 1;
                        name.to_string()
                    }
                }
            }
        };
        raw_pairs.push(RenamePair::new(file.as_str(), format!("{dir}{renamed}")));
    }

    stats.unchanged = raw_pairs.iter().filter(|pair| pair.is_noop()).count();
    let resolution = resolve_collisions_counted(raw_pairs)?;
    stats.collisions_resolved = resolution.renamed;
    stats.planned = resolution.pairs.len();

    Ok(RenamePlan {
        pairs: resolution.pairs,
        stats,
    })
}

/// Splits `path` into its directory part (with trailing separator) and the
/// final component.
fn split_file_name(path: &str) -> (&str, &str) {
    match path.rfind(std::path::is_separator) {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    }
}
