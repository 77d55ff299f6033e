use std::cmp::Ordering;
use std::path::Path;

use bytes::Bytes;
use http::StatusCode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tokio::fs;

use crate::access::is_hidden_name;
use crate::ctx::RequestPath;
use crate::static_files::render::headers::HeaderBuilder;
use crate::static_files::{ServeError, StaticBody, StaticResponse};

// Everything outside the RFC 3986 unreserved set that could break an href.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%')
    .add(b'&')
    .add(b'/')
    .add(b'\\');

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Render an HTML listing of the immediate children of `dir`.
///
/// `dir` must already be canonical and inside the document root.
pub async fn render_directory(
    dir: &Path,
    request: &RequestPath,
    show_dotfiles: bool,
) -> Result<StaticResponse, ServeError> {
    let entries = read_entries(dir, show_dotfiles).await?;
    let html = listing_html(&request.display(), !request.is_root(), &entries);
    let body = Bytes::from(html);

    let mut headers = HeaderBuilder::default();
    headers.content_type("text/html; charset=utf-8");
    headers.no_store();
    headers.content_length(body.len() as u64);

    Ok(StaticResponse {
        status: StatusCode::OK,
        headers: headers.build(),
        body: StaticBody::Bytes(body),
    })
}

pub(crate) async fn read_entries(
    dir: &Path,
    show_dotfiles: bool,
) -> Result<Vec<ListingEntry>, ServeError> {
    let mut reader = fs::read_dir(dir).await.map_err(ServeError::from_io)?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await.map_err(ServeError::from_io)? {
        // Non UTF-8 names cannot be linked reliably.
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !show_dotfiles && is_hidden_name(&name) {
            continue;
        }

        // Follow symlinks so a linked directory lists as a directory.
        let Ok(meta) = fs::metadata(entry.path()).await else {
            continue;
        };

        entries.push(ListingEntry {
            name,
            is_dir: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
        });
    }

    // Directories first, then files, each by name.
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });

    Ok(entries)
}

fn listing_html(title: &str, parent_link: bool, entries: &[ListingEntry]) -> String {
    let title = escape_html(title);
    let mut html = String::with_capacity(1024 + entries.len() * 128);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Index of {title}</title>\n"));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>Index of {title}</h1>\n"));
    html.push_str("<table>\n");

    if parent_link {
        html.push_str("<tr><td><a href=\"../\">../</a></td><td>directory</td><td></td></tr>\n");
    }

    for entry in entries {
        let slash = if entry.is_dir { "/" } else { "" };
        let (kind, size) = if entry.is_dir {
            ("directory", String::new())
        } else {
            ("file", human_size(entry.size))
        };

        html.push_str(&format!(
            "<tr><td><a href=\"./{href}{slash}\">{name}{slash}</a></td><td>{kind}</td><td>{size}</td></tr>\n",
            href = escape_href(&entry.name),
            name = escape_html(&entry.name),
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Minimal HTML escaping (sufficient for filenames)
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes a single name for an href. This is URL encoding, not HTML escaping.
pub(crate) fn escape_href(input: &str) -> String {
    utf8_percent_encode(input, HREF).to_string()
}

pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
