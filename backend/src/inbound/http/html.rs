//! Minimal server-side HTML for the back-office pages.
//!
//! Every piece of stored data goes through [`escape`]; callers pass plain
//! text and never pre-rendered markup.

use std::fmt::Write as _;

use crate::domain::{Page, User};

/// Escape text for use in element content and double-quoted attributes.
///
/// ```
/// use finlead::inbound::http::html::escape;
///
/// assert_eq!(escape("<b>\"Rao & Sons\"</b>"), "&lt;b&gt;&quot;Rao &amp; Sons&quot;&lt;/b&gt;");
/// ```
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wrap `body` markup in the back-office chrome.
pub fn layout(title: &str, admin: &User, body: &str) -> String {
    let mut html = String::from("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{} | finlead admin</title>", escape(title));
    html.push_str("</head>\n<body>\n<nav>");
    html.push_str("<a href=\"/admin\">Dashboard</a> ");
    html.push_str("<a href=\"/admin/leads/loans\">Loans</a> ");
    html.push_str("<a href=\"/admin/leads/insurance\">Insurance</a> ");
    html.push_str("<a href=\"/admin/leads/callbacks\">Callbacks</a> ");
    html.push_str("<a href=\"/admin/leads/referrals\">Referrals</a> ");
    html.push_str("<a href=\"/admin/subscribers\">Subscribers</a>");
    let _ = writeln!(
        html,
        "<span class=\"whoami\">{}</span></nav>",
        escape(admin.email.as_str())
    );
    let _ = writeln!(html, "<main>\n<h1>{}</h1>", escape(title));
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Render a table of plain-text cells.
pub fn table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape(header));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    let mut empty = true;
    for row in rows {
        empty = false;
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(&cell));
        }
        html.push_str("</tr>\n");
    }
    if empty {
        let _ = writeln!(
            html,
            "<tr><td colspan=\"{}\">Nothing here yet.</td></tr>",
            headers.len().max(1)
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Previous/next links for `page`, pointing at `base?page=N`.
pub fn pager<T>(base: &str, page: &Page<T>) -> String {
    let mut html = String::from("<nav class=\"pager\">");
    if page.page > 1 {
        let _ = write!(
            html,
            "<a rel=\"prev\" href=\"{}?page={}\">Previous</a> ",
            escape(base),
            page.page - 1
        );
    }
    let _ = write!(html, "<span>Page {} ({} total)</span>", page.page, page.total);
    if page.has_next() {
        let _ = write!(
            html,
            " <a rel=\"next\" href=\"{}?page={}\">Next</a>",
            escape(base),
            page.page + 1
        );
    }
    html.push_str("</nav>\n");
    html
}
