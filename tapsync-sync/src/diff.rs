//! Unified diffs of planned rewrites, for `--dry-run` and review.

use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};

use tapsync_core::{Change, ChangeSet};

/// A single rewritten manifest's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Unified diff for one change, with paths shown relative to `root`.
pub fn diff_change(change: &Change, root: &Path) -> FileDiff {
    let relative = change.path.strip_prefix(root).unwrap_or(change.path.as_path());
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    let unified = TextDiff::from_lines(&change.old_raw_text, &change.new_raw_text)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    FileDiff {
        path: change.path.clone(),
        unified_diff: unified,
    }
}

pub fn diff_change_set(changes: &ChangeSet, root: &Path) -> Vec<FileDiff> {
    changes.iter().map(|c| diff_change(c, root)).collect()
}

/// Lines of `old` that a rewrite removed or replaced.
pub fn touched_lines(old: &str, new: &str) -> Vec<String> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .filter(|c| c.tag() == ChangeTag::Delete)
        .map(|c| c.value().trim_end_matches(['\r', '\n']).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapsync_core::codec;

    const BASIL: &str = "class Basil < Formula
  desc 'The command-line tool for Basil framework'
  url 'https://github.com/gardenbed/basil-cli.git',
      tag: 'v0.2.0',
      revision: 'd32ddf0a33652ac6994093134bea58962a2411e5'
  head 'https://github.com/gardenbed/basil-cli.git',
       branch: 'main'
end
";

    fn change() -> Change {
        let new_raw_text =
            codec::render(BASIL, "v0.3.0", "cccccccccccccccccccccccccccccccccccccccc").unwrap();
        Change {
            path: PathBuf::from("/tap/Formula/basil.rb"),
            name: "basil".to_string(),
            from_tag: "v0.2.0".to_string(),
            to_tag: "v0.3.0".to_string(),
            to_revision: "cccccccccccccccccccccccccccccccccccccccc".to_string(),
            old_raw_text: BASIL.to_string(),
            new_raw_text,
        }
    }

    #[test]
    fn render_touches_only_tag_and_revision_lines() {
        let change = change();
        assert_eq!(
            touched_lines(&change.old_raw_text, &change.new_raw_text),
            vec![
                "      tag: 'v0.2.0',".to_string(),
                "      revision: 'd32ddf0a33652ac6994093134bea58962a2411e5'".to_string(),
            ]
        );
    }

    #[test]
    fn unified_diff_uses_relative_headers() {
        let diff = diff_change(&change(), Path::new("/tap"));
        assert!(diff.unified_diff.contains("--- a/Formula/basil.rb"));
        assert!(diff.unified_diff.contains("+++ b/Formula/basil.rb"));
        assert!(diff.unified_diff.contains("+      tag: 'v0.3.0',"));
        assert!(diff.unified_diff.contains("@@"));
    }
}
