//! The fixed document shell every payload is delivered in.

use std::sync::OnceLock;

use lectern_core::command::NEUTRAL_TITLE;
use lectern_core::models::{top_anchor_id, Coordinate};
use regex::Regex;

/// Stylesheet and scripts every document references, relative to the
/// resource directory.
pub const STYLESHEET: &str = "theText.css";
pub const SCRIPTS: [&str; 2] = ["theText.js", "w3.js"];

/// Script block exposing the active reference as page globals so that
/// client-side link handlers can read what is currently shown.
#[must_use]
pub fn active_reference_script(active: &Coordinate) -> String {
    format!(
        "<script>var activeText = '{}'; var activeB = {}; var activeC = {}; var activeV = {};</script>",
        escape_js_single_quoted(&active.source),
        active.book,
        active.chapter,
        active.verse
    )
}

/// Wrap `content` into a complete document.
///
/// `active` is the destination channel's reference; overlays and the
/// instant surface have none and get no reference globals.
#[must_use]
pub fn wrap_document(content: &str, active: Option<&Coordinate>, font_size: u32) -> String {
    let mut head = String::new();
    head.push_str(&format!(
        "<link rel='stylesheet' type='text/css' href='{STYLESHEET}'>"
    ));
    for script in SCRIPTS {
        head.push_str(&format!("<script src='{script}'></script>"));
    }
    if let Some(active) = active {
        head.push_str(&active_reference_script(active));
    }
    head.push_str("<script>var versionList = []; var compareList = []; var parallelList = [];</script>");

    format!(
        "<!DOCTYPE html><html><head><title>{NEUTRAL_TITLE}</title>{head}</head><body style='font-size: {font_size}%;'><span id='{}'></span>{content}</body></html>",
        top_anchor_id()
    )
}

/// Prepare plain text (notes, history pages) for the shell: line breaks and
/// tabs become markup and ordinary hyperlinks become `website(...)` or
/// `uba(...)` handlers.
#[must_use]
pub fn wrap_plain_text(text: &str, linebreak: bool) -> String {
    let mut text = text.to_owned();
    if linebreak {
        text = text.replace("\r\n", "<br>").replace(['\r', '\n'], "<br>");
        text = text.replace('\t', "&emsp;&emsp;");
    }
    for (pattern, replacement) in plain_text_rules() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

fn plain_text_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        let raw: [(&str, &'static str); 4] = [
            (r"<br>(<table>|<ol>|<ul>)", "${1}"),
            (r"(</table>|</ol>|</ul>)<br>", "${1}"),
            (
                r#"<a [^\n<>]*?href=['"]([^\n<>]*?)['"][^\n<>]*?>"#,
                r#"<a href='javascript:void(0)' onclick='website("${1}")'>"#,
            ),
            (
                r#"onclick='website\("([^\n<>]*?)\.uba"\)'"#,
                r#"onclick='uba("${1}.uba")'"#,
            ),
        ];
        raw.into_iter()
            .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
                Ok(regex) => Some((regex, replacement)),
                Err(err) => {
                    log::error!("compile plain text rule {pattern:?}: {err}");
                    None
                }
            })
            .collect()
    })
}

fn escape_js_single_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}
