//! Parse/render round-trip tests for the formula codec.
//!
//! Each `#[case]` is isolated; the fixtures mirror real tap formulas.

use rstest::rstest;
use tapsync_core::codec::{parse, render};
use tapsync_core::CodecError;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MULTILINE_SINGLE: &str = "# The formula for installing changelog binary.
class Changelog < Formula
  desc 'The Simple Changelog Generator'
  license 'ISC'
  homepage 'https://github.com/gardenbed/changelog'
  url 'https://github.com/gardenbed/changelog.git',
      tag: 'v0.1.1',
      revision: '12d34b8434a200670b1060df5c5b6ae7b920393c'
  head 'https://github.com/gardenbed/changelog.git',
       branch: 'main'

  depends_on 'go' => :build

  def install
    commit = `git rev-parse --short HEAD`
    system 'go', 'build', './cmd/changelog'
    bin.install 'changelog'
  end
end
";

const ONE_LINE_DOUBLE: &str = "class Emerge < Formula
  url \"https://github.com/gardenbed/emerge.git\", tag: \"v0.2.0\", revision: \"fccd6aaf6d87ad561db04fff58e40dab3c8871c5\"
end
";

const HASH_ROCKET_MIXED: &str = "class BasilCli < Formula
\turl 'https://github.com/gardenbed/basil-cli.git',
\t    :tag => \"v0.2.0\",
\t    :revision => 'd32ddf0a33652ac6994093134bea58962a2411e5'
end
";

const NO_CLASS_CRLF: &str = "url 'https://github.com/gardenbed/basil-cli.git',\r\n    tag: 'v0.2.0',\r\n    revision: 'd32ddf0a33652ac6994093134bea58962a2411e5'\r\n";

const NEW_REV: &str = "cccccccccccccccccccccccccccccccccccccccc";

/// Undoing the substitution must give back the original text exactly.
fn assert_only_values_changed(old: &str, new: &str, old_values: [&str; 2], new_values: [&str; 2]) {
    let mut restored = new.to_string();
    for (o, n) in old_values.iter().zip(new_values.iter()) {
        restored = restored.replacen(n, o, 1);
    }
    assert_eq!(restored, old, "render touched bytes outside the tag/revision literals");
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[rstest]
#[case("multiline_single_quotes", MULTILINE_SINGLE, Some("changelog"), "v0.1.1")]
#[case("one_line_double_quotes", ONE_LINE_DOUBLE, Some("emerge"), "v0.2.0")]
#[case("hash_rocket_mixed_quotes", HASH_ROCKET_MIXED, Some("basil-cli"), "v0.2.0")]
#[case("no_class_crlf", NO_CLASS_CRLF, None, "v0.2.0")]
fn render_then_parse_recovers_values(
    #[case] label: &str,
    #[case] text: &str,
    #[case] name: Option<&str>,
    #[case] pinned: &str,
) {
    let before = parse(text).unwrap_or_else(|e| panic!("[{label}] parse failed: {e}"));
    assert_eq!(before.name.as_deref(), name, "[{label}] name");
    assert_eq!(before.pinned_tag, pinned, "[{label}] pinned tag");

    let rendered = render(text, "v9.9.9", NEW_REV)
        .unwrap_or_else(|e| panic!("[{label}] render failed: {e}"));
    let after = parse(&rendered).unwrap_or_else(|e| panic!("[{label}] reparse failed: {e}"));

    assert_eq!(after.pinned_tag, "v9.9.9", "[{label}] tag");
    assert_eq!(after.pinned_revision, NEW_REV, "[{label}] revision");
    assert_eq!(after.source_url, before.source_url, "[{label}] url");
    assert_eq!(after.name, before.name, "[{label}] name");
    assert_only_values_changed(
        text,
        &rendered,
        [&before.pinned_tag, &before.pinned_revision],
        ["v9.9.9", NEW_REV],
    );
}

#[test]
fn render_preserves_quote_style_per_literal() {
    let rendered = render(HASH_ROCKET_MIXED, "v0.3.0", NEW_REV).unwrap();
    assert!(rendered.contains(":tag => \"v0.3.0\","));
    assert!(rendered.contains(&format!(":revision => '{NEW_REV}'")));
}

#[test]
fn head_branch_stanza_is_ignored() {
    let rendered = render(MULTILINE_SINGLE, "v0.1.2", NEW_REV).unwrap();
    assert!(rendered.contains("       branch: 'main'\n"));
    assert_eq!(rendered.matches("v0.1.2").count(), 1);
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

#[rstest]
#[case("empty", "")]
#[case("head_only", "class X < Formula\n  head 'https://github.com/a/b.git', branch: 'main'\nend\n")]
#[case("sha256_archive", "class X < Formula\n  url 'https://example.com/x.tar.gz'\n  sha256 'abc'\nend\n")]
#[case("unterminated", "class X < Formula\n  url 'https://github.com/a/b.git', tag: 'v1, revision: 'abc'\nend\n")]
fn malformed_text_is_rejected(#[case] label: &str, #[case] text: &str) {
    let err = parse(text).expect_err(label);
    assert_eq!(err, CodecError::MissingUrlStanza, "[{label}]");
    assert!(render(text, "v1", "abc").is_err(), "[{label}] render must fail too");
}
