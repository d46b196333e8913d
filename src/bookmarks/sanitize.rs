//! Whitelist-based XSS filter for user-supplied text.
//!
//! Tags on the whitelist are rebuilt with only their allowed attributes;
//! every other tag is escaped so it renders as text. Comments are dropped
//! and stray `<`/`>` are escaped.

use super::store::Bookmark;

const SAFE_URL_PREFIXES: &[&str] = &[
    "http://", "https://", "mailto:", "tel:", "ftp://", "data:image/", "#", "/", "./", "../",
];

fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    let attrs: &'static [&'static str] = match tag {
        "a" => &["target", "href", "title"],
        "abbr" | "acronym" => &["title"],
        "area" => &["shape", "coords", "href", "alt"],
        "audio" => &["autoplay", "controls", "crossorigin", "loop", "muted", "preload", "src"],
        "bdi" | "bdo" => &["dir"],
        "blockquote" | "q" => &["cite"],
        "col" | "colgroup" => &["align", "valign", "span", "width"],
        "del" | "ins" => &["datetime"],
        "details" => &["open"],
        "font" => &["color", "size", "face"],
        "img" => &["src", "alt", "title", "width", "height", "loading"],
        "table" => &["width", "border", "align", "valign"],
        "tbody" | "tfoot" | "thead" => &["align", "valign"],
        "td" | "th" => &["width", "rowspan", "colspan", "align", "valign"],
        "tr" => &["rowspan", "align", "valign"],
        "video" => &[
            "autoplay", "controls", "crossorigin", "loop", "muted", "playsinline", "poster", "preload", "src",
            "height", "width",
        ],
        "address" | "article" | "aside" | "b" | "big" | "br" | "caption" | "center" | "cite" | "code" | "dd"
        | "div" | "dl" | "dt" | "em" | "figcaption" | "figure" | "footer" | "h1" | "h2" | "h3" | "h4" | "h5"
        | "h6" | "header" | "hr" | "i" | "kbd" | "li" | "mark" | "nav" | "ol" | "p" | "pre" | "s" | "section"
        | "small" | "span" | "strike" | "strong" | "sub" | "summary" | "sup" | "tt" | "u" | "ul" => &[],
        _ => return None,
    };
    Some(attrs)
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_safe_url(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    SAFE_URL_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

/// Finds the `>` closing the tag opened at `start`, honouring quoted
/// attribute values. `None` means another `<` came first or the input ended.
fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut prev = b'<';
    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if prev == b'=' => quote = Some(b),
                b'>' => return Some(i),
                b'<' => return None,
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
    }
    None
}

struct Attribute<'a> {
    name: String,
    value: Option<&'a str>,
}

fn parse_attributes(src: &str) -> Vec<Attribute<'_>> {
    let bytes = src.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        if name_start == i {
            break;
        }
        let name = src[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            attrs.push(Attribute { name, value: None });
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < bytes.len() && matches!(bytes[i], b'"' | b'\'') {
            let quote = bytes[i];
            let value_start = i + 1;
            let value_end = src[value_start..]
                .bytes()
                .position(|b| b == quote)
                .map_or(bytes.len(), |p| value_start + p);
            i = (value_end + 1).min(bytes.len());
            &src[value_start..value_end]
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            &src[value_start..i]
        };
        attrs.push(Attribute {
            name,
            value: Some(value),
        });
    }

    attrs
}

/// Rebuilds a single tag (`inner` is the text between `<` and `>`).
/// Returns `None` when the tag is not whitelisted.
fn filter_tag(inner: &str) -> Option<String> {
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_end = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(rest.len());
    let name = rest[..name_end].to_ascii_lowercase();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let allowed = allowed_attributes(&name)?;

    if closing {
        return Some(format!("</{name}>"));
    }

    let body = &rest[name_end..];
    let self_closing = body.trim_end().ends_with('/');

    let mut html = format!("<{name}");
    for attr in parse_attributes(body) {
        if !allowed.contains(&attr.name.as_str()) {
            continue;
        }
        match attr.value {
            None => {
                html.push(' ');
                html.push_str(&attr.name);
            }
            Some(value) => {
                if matches!(attr.name.as_str(), "href" | "src" | "poster" | "cite") && !is_safe_url(value) {
                    continue;
                }
                html.push_str(&format!(" {}=\"{}\"", attr.name, escape_attr_value(value)));
            }
        }
    }
    if self_closing {
        html.push_str(" /");
    }
    html.push('>');
    Some(html)
}

/// Removes executable markup from `input` while keeping benign formatting.
pub fn sanitize_html(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('<') {
        let start = pos + offset;
        escape_text(&input[pos..start], &mut out);

        if input[start..].starts_with("<!--") {
            pos = match input[start + 4..].find("-->") {
                Some(end) => start + 4 + end + 3,
                None => input.len(),
            };
            continue;
        }

        match find_tag_end(bytes, start) {
            Some(end) => {
                let tag_src = &input[start..=end];
                match filter_tag(&input[start + 1..end]) {
                    Some(html) => out.push_str(&html),
                    None => escape_text(tag_src, &mut out),
                }
                pos = end + 1;
            }
            None => {
                // Not a tag; emit the `<` as text and rescan after it.
                out.push_str("&lt;");
                pos = start + 1;
            }
        }
    }

    escape_text(&input[pos..], &mut out);
    out
}

/// Sanitizes the free-text fields of a bookmark; `id`, `url` and `rating`
/// pass through unchanged.
pub fn sanitize_bookmark(bookmark: Bookmark) -> Bookmark {
    Bookmark {
        title: sanitize_html(&bookmark.title),
        description: bookmark.description.as_deref().map(sanitize_html),
        ..bookmark
    }
}
