//! History picker pages, newest entry first.

use lectern_core::models::Channel;

/// Body of the history page for `channel`. `entries` are `(index, command)`
/// pairs oldest to newest; buttons call back with the original index.
#[must_use]
pub fn history_page(channel: Channel, entries: &[(usize, String)]) -> String {
    let rows: Vec<String> = entries
        .iter()
        .rev()
        .map(|(index, record)| {
            let label = escape_html(record);
            match channel {
                Channel::External => format!(
                    "<button class='feature' onclick='openExternalRecord({index})'>{label}</button> [<ref onclick='editExternalRecord({index})'>edit</ref>]"
                ),
                Channel::Primary | Channel::Secondary => format!(
                    "<button class='feature' onclick='openHistoryRecord({index})'>{label}</button>"
                ),
            }
        })
        .collect();
    rows.join("<br>")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
