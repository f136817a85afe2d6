use crate::collision::RenamePair;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
}

/// Renames every pair in order, stopping at the first failure.
///
/// The batch is checked up front so that nothing is touched when a source is
/// missing, listed twice, or a target would overwrite an existing file.
/// Renames completed before a failure are left in place.
pub fn apply_pairs(pairs: &[RenamePair]) -> Result<ApplyResult> {
    validate_pairs(pairs)?;

    for (done, pair) in pairs.iter().enumerate() {
        fs::rename(&pair.source, &pair.target).with_context(|| {
            format!(
                "rename failed after {} of {} files: {} -> {}",
                done,
                pairs.len(),
                pair.source,
                pair.target
            )
        })?;
        info!(source = %pair.source, target = %pair.target, "renamed");
    }

    Ok(ApplyResult {
        applied: pairs.len(),
    })
}

fn validate_pairs(pairs: &[RenamePair]) -> Result<()> {
    let mut seen_sources = HashSet::<&str>::new();
    let mut seen_targets = HashSet::<&str>::new();

    for pair in pairs {
        if pair.is_noop() {
            bail!("source and target are identical: {}", pair.source);
        }
        if !seen_sources.insert(pair.source.as_str()) {
            bail!("duplicate source in batch: {}", pair.source);
        }
        if !seen_targets.insert(pair.target.as_str()) {
            bail!("duplicate target in batch: {}", pair.target);
        }

        let source = Path::new(&pair.source);
        fs::symlink_metadata(source)
            .with_context(|| format!("source file is not accessible: {}", pair.source))?;

        let target = Path::new(&pair.target);
        if target.exists() && !is_same_file(source, target)? {
            bail!("target already exists: {}", pair.target);
        }
    }

    Ok(())
}

/// Case-only renames on case-insensitive filesystems report the target as
/// existing; it is the source itself.
fn is_same_file(source: &Path, target: &Path) -> Result<bool> {
    let source = fs::canonicalize(source)
        .with_context(|| format!("could not resolve source: {}", source.display()))?;
    let target = fs::canonicalize(target)
        .with_context(|| format!("could not resolve target: {}", target.display()))?;
    Ok(source == target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    fn pair(from: &Path, to: &Path) -> RenamePair {
        RenamePair::new(path_str(from), path_str(to))
    }

    #[test]
    fn renames_every_pair() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("a_04-01-2004.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"A").expect("write a");
        fs::write(&b, b"B").expect("write b");

        let a_new = temp.path().join("a_2004-04-01.txt");
        let b_new = temp.path().join("b_2.txt");
        let result = apply_pairs(&[pair(&a, &a_new), pair(&b, &b_new)]).expect("apply");

        assert_eq!(result.applied, 2);
        assert!(!a.exists());
        assert_eq!(fs::read(&a_new).expect("read a"), b"A");
        assert_eq!(fs::read(&b_new).expect("read b"), b"B");
    }

    #[test]
    fn refuses_to_overwrite_existing_target() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("a.txt");
        let taken = temp.path().join("taken.txt");
        fs::write(&a, b"A").expect("write a");
        fs::write(&taken, b"T").expect("write taken");

        let err = apply_pairs(&[pair(&a, &taken)]).expect_err("must refuse");
        assert!(err.to_string().contains("target already exists"));
        assert!(a.exists());
        assert_eq!(fs::read(&taken).expect("read taken"), b"T");
    }

    #[test]
    fn refuses_missing_source_before_touching_anything() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("a.txt");
        fs::write(&a, b"A").expect("write a");
        let missing = temp.path().join("missing.txt");

        let err = apply_pairs(&[
            pair(&a, &temp.path().join("a2.txt")),
            pair(&missing, &temp.path().join("m2.txt")),
        ])
        .expect_err("must refuse");
        assert!(err.to_string().contains("source file is not accessible"));
        assert!(a.exists(), "first file must stay untouched");
    }

    #[test]
    fn refuses_duplicate_targets() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"A").expect("write a");
        fs::write(&b, b"B").expect("write b");
        let same = temp.path().join("same.txt");

        let err = apply_pairs(&[pair(&a, &same), pair(&b, &same)]).expect_err("must refuse");
        assert!(err.to_string().contains("duplicate target"));
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn stops_at_first_failed_rename() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        let c = temp.path().join("c.txt");
        fs::write(&a, b"A").expect("write a");
        fs::write(&b, b"B").expect("write b");
        fs::write(&c, b"C").expect("write c");

        let a_new = temp.path().join("a_new.txt");
        let unreachable = temp.path().join("no_such_dir").join("b.txt");
        let c_new = temp.path().join("c_new.txt");

        let err = apply_pairs(&[pair(&a, &a_new), pair(&b, &unreachable), pair(&c, &c_new)])
            .expect_err("second rename must fail");
        assert!(err.to_string().contains("after 1 of 3"));
        assert!(a_new.exists(), "completed rename is kept");
        assert!(b.exists());
        assert!(c.exists(), "later pairs are not attempted");
        assert!(!c_new.exists());
    }
}
