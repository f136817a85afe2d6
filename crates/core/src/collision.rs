use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// An original name and the name it should be renamed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    pub source: String,
    pub target: String,
}

impl RenamePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("collision removal failed: `{target}` is still claimed by more than one file")]
    Unresolved { target: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub pairs: Vec<RenamePair>,
    /// Number of pairs whose target received a numeric suffix.
    pub renamed: usize,
}

/// Drops no-op pairs and makes every remaining target unique.
///
/// Later pairs that share a target with an earlier one get `_2`, `_3`, ...
/// inserted before the extension; the first occurrence keeps its name.
pub fn resolve_collisions(pairs: Vec<RenamePair>) -> Result<Vec<RenamePair>, CollisionError> {
    resolve_collisions_counted(pairs).map(|resolution| resolution.pairs)
}

pub fn resolve_collisions_counted(pairs: Vec<RenamePair>) -> Result<Resolution, CollisionError> {
    let mut pairs: Vec<RenamePair> = pairs
        .into_iter()
        .filter(|pair| {
            if pair.is_noop() {
                debug!(source = %pair.source, "skipping no-op rename");
            }
            !pair.is_noop()
        })
        .collect();

    let groups = collision_groups(&pairs);
    let mut claimed: HashSet<String> = pairs.iter().map(|pair| pair.target.clone()).collect();
    let mut renamed = 0usize;

    for later in groups.values() {
        let mut n = 2usize;
        for &index in later {
            let pair = &mut pairs[index];
            let candidate = loop {
                let candidate = insert_counter(&pair.target, n);
                n += 1;
                if candidate != pair.source && !claimed.contains(&candidate) {
                    break candidate;
                }
            };
            debug!(source = %pair.source, from = %pair.target, to = %candidate, "resolved collision");
            claimed.insert(candidate.clone());
            pair.target = candidate;
            renamed += 1;
        }
    }

    verify_unique_targets(&pairs)?;
    Ok(Resolution { pairs, renamed })
}

/// Maps the index of each first occurrence to the later indices sharing its
/// target. Each later index belongs to exactly one group.
fn collision_groups(pairs: &[RenamePair]) -> BTreeMap<usize, Vec<usize>> {
    let mut first_seen = HashMap::<&str, usize>::new();
    let mut groups = BTreeMap::<usize, Vec<usize>>::new();

    for (index, pair) in pairs.iter().enumerate() {
        match first_seen.get(pair.target.as_str()) {
            Some(&first) => groups.entry(first).or_default().push(index),
            None => {
                first_seen.insert(pair.target.as_str(), index);
            }
        }
    }

    groups
}

/// `dir/name.ext` with `n = 2` becomes `dir/name_2.ext`; names without an
/// extension get the counter appended.
pub fn insert_counter(path: &str, n: usize) -> String {
    let name_start = path
        .rfind(std::path::is_separator)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let name = &path[name_start..];

    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => {
            let split = name_start + dot;
            format!("{}_{}{}", &path[..split], n, &path[split..])
        }
        _ => format!("{path}_{n}"),
    }
}

fn verify_unique_targets(pairs: &[RenamePair]) -> Result<(), CollisionError> {
    let mut seen = HashSet::<&str>::with_capacity(pairs.len());
    for pair in pairs {
        if pair.is_noop() || !seen.insert(pair.target.as_str()) {
            return Err(CollisionError::Unresolved {
                target: pair.target.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(targets: &[&str]) -> Vec<RenamePair> {
        targets
            .iter()
            .enumerate()
            .map(|(i, target)| RenamePair::new(format!("src{i}"), *target))
            .collect()
    }

    fn targets(pairs: &[RenamePair]) -> Vec<&str> {
        pairs.iter().map(|pair| pair.target.as_str()).collect()
    }

    #[test]
    fn suffixes_later_duplicates_before_extension() {
        let resolved =
            resolve_collisions(pairs(&["a.txt", "b.txt", "a.txt", "a.txt"])).expect("resolves");
        assert_eq!(targets(&resolved), ["a.txt", "b.txt", "a_2.txt", "a_3.txt"]);
    }

    #[test]
    fn each_group_counts_independently() {
        let resolved = resolve_collisions(pairs(&["x.md", "y.md", "y.md", "x.md", "y.md"]))
            .expect("resolves");
        assert_eq!(
            targets(&resolved),
            ["x.md", "y.md", "y_2.md", "x_2.md", "y_3.md"]
        );
    }

    #[test]
    fn drops_noop_pairs() {
        let input = vec![
            RenamePair::new("same.txt", "same.txt"),
            RenamePair::new("old.txt", "new.txt"),
        ];
        let resolved = resolve_collisions(input).expect("resolves");
        assert_eq!(resolved, vec![RenamePair::new("old.txt", "new.txt")]);
        assert!(resolved.iter().all(|pair| !pair.is_noop()));
    }

    #[test]
    fn skips_counters_already_claimed() {
        let resolved =
            resolve_collisions(pairs(&["a.txt", "a.txt", "a_2.txt"])).expect("resolves");
        assert_eq!(targets(&resolved), ["a.txt", "a_3.txt", "a_2.txt"]);
    }

    #[test]
    fn never_produces_a_noop_while_resolving() {
        let input = vec![
            RenamePair::new("first", "report"),
            RenamePair::new("report_2", "report"),
        ];
        let resolved = resolve_collisions(input).expect("resolves");
        assert_eq!(targets(&resolved), ["report", "report_3"]);
    }

    #[test]
    fn output_targets_are_injective() {
        let names = ["n.a", "n.a", "n", "n", "n_2", ".cfg", ".cfg", "n.a", "n_2.a"];
        let resolved = resolve_collisions(pairs(&names)).expect("resolves");
        assert_eq!(resolved.len(), names.len());
        let unique: HashSet<&str> = targets(&resolved).into_iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn counts_renamed_pairs() {
        let resolution = resolve_collisions_counted(pairs(&["a", "a", "b", "a"])).expect("resolves");
        assert_eq!(resolution.renamed, 2);
    }

    #[test]
    fn counter_insertion_respects_extension_and_directories() {
        assert_eq!(insert_counter("file.txt", 2), "file_2.txt");
        assert_eq!(insert_counter("archive.tar.gz", 2), "archive.tar_2.gz");
        assert_eq!(insert_counter("Makefile", 3), "Makefile_3");
        assert_eq!(insert_counter(".bashrc", 2), ".bashrc_2");
        assert_eq!(insert_counter("trailing.", 2), "trailing._2");
        assert_eq!(insert_counter("v1.0/notes", 2), "v1.0/notes_2");
        assert_eq!(insert_counter("v1.0/notes.md", 2), "v1.0/notes_2.md");
    }

    #[test]
    fn verification_reports_duplicates() {
        let err = verify_unique_targets(&pairs(&["a", "a"])).expect_err("must fail");
        assert_eq!(
            err,
            CollisionError::Unresolved {
                target: "a".to_string()
            }
        );
    }
}
