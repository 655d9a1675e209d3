//! Formula `url` stanza codec.
//!
//! A formula pins its source with a stanza of the form
//!
//! ```text
//! url 'https://github.com/gardenbed/basil-cli.git',
//!     tag: 'v0.2.0',
//!     revision: 'd32ddf0a33652ac6994093134bea58962a2411e5'
//! ```
//!
//! [`parse`] extracts the three values (plus the formula name from the
//! `class X < Formula` line). [`render`] substitutes new `tag`/`revision`
//! values in place; every byte outside the two value literals is preserved,
//! including quote style and indentation.

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Match, Regex};

use crate::error::CodecError;

const URL_STANZA: &str = r#"(?m)^[ \t]*url\s+(?:'(?P<url_s>[^'\n]*)'|"(?P<url_d>[^"\n]*)")\s*,\s*(?:tag:|:tag\s*=>)\s*(?:'(?P<tag_s>[^'\n]*)'|"(?P<tag_d>[^"\n]*)")\s*,\s*(?:revision:|:revision\s*=>)\s*(?:'(?P<rev_s>[^'\n]*)'|"(?P<rev_d>[^"\n]*)")"#;

const CLASS_DECL: &str = r"(?m)^[ \t]*class\s+(?P<class>[A-Z][A-Za-z0-9_]*)\s*<\s*Formula\b";

fn url_stanza() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_STANZA).expect("url stanza pattern compiles"))
}

fn class_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CLASS_DECL).expect("class pattern compiles"))
}

/// Values extracted from a formula's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFields {
    /// Formula name derived from the class declaration, if there is one.
    pub name: Option<String>,
    pub source_url: String,
    pub pinned_tag: String,
    pub pinned_revision: String,
}

struct Located {
    fields: ManifestFields,
    tag: Range<usize>,
    revision: Range<usize>,
}

fn either<'t>(caps: &Captures<'t>, single: &str, double: &str) -> Option<Match<'t>> {
    caps.name(single).or_else(|| caps.name(double))
}

fn locate(raw_text: &str) -> Result<Located, CodecError> {
    let caps = url_stanza()
        .captures(raw_text)
        .ok_or(CodecError::MissingUrlStanza)?;

    let (Some(url), Some(tag), Some(revision)) = (
        either(&caps, "url_s", "url_d"),
        either(&caps, "tag_s", "tag_d"),
        either(&caps, "rev_s", "rev_d"),
    ) else {
        return Err(CodecError::MissingUrlStanza);
    };

    let name = class_decl()
        .captures(raw_text)
        .and_then(|c| c.name("class"))
        .map(|m| formula_name(m.as_str()));

    Ok(Located {
        fields: ManifestFields {
            name,
            source_url: url.as_str().to_string(),
            pinned_tag: tag.as_str().to_string(),
            pinned_revision: revision.as_str().to_string(),
        },
        tag: tag.range(),
        revision: revision.range(),
    })
}

/// Extract `{name, source_url, pinned_tag, pinned_revision}` from formula text.
///
/// Fails with [`CodecError::MissingUrlStanza`] when the stanza is absent or
/// incomplete.
pub fn parse(raw_text: &str) -> Result<ManifestFields, CodecError> {
    locate(raw_text).map(|l| l.fields)
}

/// Rewrite the pinned `tag` and `revision` values, leaving all other bytes as-is.
pub fn render(raw_text: &str, new_tag: &str, new_revision: &str) -> Result<String, CodecError> {
    validate_value("tag", new_tag)?;
    validate_value("revision", new_revision)?;

    let located = locate(raw_text)?;
    let (tag, revision) = (located.tag, located.revision);

    let mut out = String::with_capacity(raw_text.len() + new_tag.len() + new_revision.len());
    out.push_str(&raw_text[..tag.start]);
    out.push_str(new_tag);
    out.push_str(&raw_text[tag.end..revision.start]);
    out.push_str(new_revision);
    out.push_str(&raw_text[revision.end..]);
    Ok(out)
}

fn validate_value(field: &'static str, value: &str) -> Result<(), CodecError> {
    if value.is_empty() || value.contains(['\'', '"', '\\', '\n', '\r']) {
        return Err(CodecError::InvalidValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// `BasilCli` → `basil-cli`, following Homebrew's class-to-formula naming.
pub fn formula_name(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in class_name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower_or_digit {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIL: &str = "# The formula for installing basil binary.
class Basil < Formula
  desc 'The command-line tool for Basil framework'
  url 'https://github.com/gardenbed/basil-cli.git',
      tag: 'v0.2.0',
      revision: 'd32ddf0a33652ac6994093134bea58962a2411e5'
  head 'https://github.com/gardenbed/basil-cli.git',
       branch: 'main'
end
";

    #[test]
    fn parses_stanza_and_name() {
        let fields = parse(BASIL).unwrap();
        assert_eq!(fields.name.as_deref(), Some("basil"));
        assert_eq!(fields.source_url, "https://github.com/gardenbed/basil-cli.git");
        assert_eq!(fields.pinned_tag, "v0.2.0");
        assert_eq!(
            fields.pinned_revision,
            "d32ddf0a33652ac6994093134bea58962a2411e5"
        );
    }

    #[test]
    fn render_replaces_only_values() {
        let out = render(BASIL, "v0.3.0", "cccccccccccccccccccccccccccccccccccccccc").unwrap();
        assert!(out.contains("      tag: 'v0.3.0',\n"));
        assert!(out.contains("      revision: 'cccccccccccccccccccccccccccccccccccccccc'\n"));
        assert_eq!(
            out.replace("v0.3.0", "v0.2.0").replace(
                "cccccccccccccccccccccccccccccccccccccccc",
                "d32ddf0a33652ac6994093134bea58962a2411e5"
            ),
            BASIL
        );
    }

    #[test]
    fn render_with_same_values_is_identity() {
        let out = render(BASIL, "v0.2.0", "d32ddf0a33652ac6994093134bea58962a2411e5").unwrap();
        assert_eq!(out, BASIL);
    }

    #[test]
    fn render_rejects_quote_in_value() {
        let err = render(BASIL, "v1'", "abc").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidValue {
                field: "tag",
                value: "v1'".into()
            }
        );
    }

    #[test]
    fn missing_revision_is_an_error() {
        let text = "class X < Formula\n  url 'https://github.com/a/b.git', tag: 'v1'\nend\n";
        assert_eq!(parse(text).unwrap_err(), CodecError::MissingUrlStanza);
    }

    #[test]
    fn formula_name_kebab_cases_class() {
        assert_eq!(formula_name("Basil"), "basil");
        assert_eq!(formula_name("BasilCli"), "basil-cli");
        assert_eq!(formula_name("Go123Tool"), "go123-tool");
    }
}
