//! Tab labels derived from the active reference.

use lectern_core::command::COMPARISON_KEYWORDS;
use lectern_core::models::Coordinate;

/// Formats a (book, chapter, verse) triple as a human-readable reference.
pub trait ReferenceFormatter {
    fn format(&self, book: u32, chapter: u32, verse: u32) -> String;
}

impl<F> ReferenceFormatter for F
where
    F: Fn(u32, u32, u32) -> String,
{
    fn format(&self, book: u32, chapter: u32, verse: u32) -> String {
        self(book, chapter, verse)
    }
}

/// Label and tooltip for a freshly drawn tab: `"<source> - <reference>"`,
/// or `"<keyword> - <reference>"` after a compare/parallel command, where
/// only the trailing reference component is kept.
#[must_use]
pub fn tab_label(
    active: &Coordinate,
    formatter: &dyn ReferenceFormatter,
    last_keyword: Option<&str>,
) -> String {
    let reference = formatter.format(active.book, active.chapter, active.verse);
    let label = format!("{} - {reference}", active.source);
    match last_keyword {
        Some(keyword) if is_comparison(keyword) => {
            let trailing = label.rsplit(" - ").next().unwrap_or(reference.as_str());
            format!("{keyword} - {trailing}")
        }
        _ => label,
    }
}

fn is_comparison(keyword: &str) -> bool {
    COMPARISON_KEYWORDS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(keyword))
}
