//! Rewriting of embedded click handlers into live jump/preview pairs.
//!
//! Two handler shapes are recognised inside `onclick` attributes (single or
//! double quoted, optional spaces after commas):
//!
//! - `bcv(book,chapter,verse)`: kept, and paired with an
//!   `onmouseover="imv(book,chapter,verse)"` preview handler.
//! - `cr(code,chapter,verse)`: a legacy cross-reference whose book number
//!   comes from an older numbering scheme. The code is translated and the
//!   handler re-emitted as the same `bcv`/`imv` pair.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const BCV_PATTERN: &str = r#"onclick=['"]bcv\(([0-9]+), *([0-9]+), *([0-9]+)\)['"]"#;
const CR_PATTERN: &str = r#"onclick=['"]cr\(([0-9]+), *([0-9]+), *([0-9]+)\)['"]"#;

/// Converts a book code from the legacy cross-reference numbering into the
/// book number used by live links.
pub trait BookNumberTranslator {
    fn translate_book_number(&self, code: u32) -> u32;
}

impl<F> BookNumberTranslator for F
where
    F: Fn(u32) -> u32,
{
    fn translate_book_number(&self, code: u32) -> u32 {
        self(code)
    }
}

/// The handler pair emitted for a resolved coordinate.
#[must_use]
pub fn jump_handlers(book: u32, chapter: u32, verse: u32) -> String {
    format!(r#"onclick="bcv({book},{chapter},{verse})" onmouseover="imv({book},{chapter},{verse})""#)
}

/// Rewrite every `bcv` and `cr` handler in `html`.
#[must_use]
pub fn rewrite_links(html: &str, translator: &dyn BookNumberTranslator) -> String {
    let mut html = match bcv_pattern() {
        Some(pattern) => pattern
            .replace_all(html, |caps: &Captures<'_>| {
                format!(
                    r#"onclick="bcv({},{},{})" onmouseover="imv({},{},{})""#,
                    &caps[1], &caps[2], &caps[3], &caps[1], &caps[2], &caps[3]
                )
            })
            .into_owned(),
        None => html.to_owned(),
    };
    if let Some(pattern) = cr_pattern() {
        html = pattern
            .replace_all(&html, |caps: &Captures<'_>| convert_cross_reference(caps, translator))
            .into_owned();
    }
    html
}

fn convert_cross_reference(caps: &Captures<'_>, translator: &dyn BookNumberTranslator) -> String {
    let parsed = (
        caps[1].parse::<u32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<u32>(),
    );
    match parsed {
        (Ok(code), Ok(chapter), Ok(verse)) => {
            let book = translator.translate_book_number(code);
            jump_handlers(book, chapter, verse)
        }
        _ => {
            log::warn!("cross-reference out of range: {}", &caps[0]);
            caps[0].to_owned()
        }
    }
}

fn bcv_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| compile(BCV_PATTERN)).as_ref()
}

fn cr_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| compile(CR_PATTERN)).as_ref()
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("compile link pattern {pattern:?}: {err}");
            None
        }
    }
}
