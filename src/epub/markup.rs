//! Text-node rewriting for HTML and XHTML documents.
//!
//! The document is not re-serialised: tags, attributes, comments, CDATA sections,
//! declarations and the bodies of `<script>`/`<style>` elements are copied
//! byte-for-byte, and only the text between them goes through the converter.
//! Numeric character references in text are decoded first so the converter sees
//! the characters they stand for.

use super::convert::ScriptConverter;

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn convert_markup(input: &str, converter: &dyn ScriptConverter) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let end = input[pos..].find('<').map_or(bytes.len(), |off| pos + off);
            out.push_str(&convert_text(&input[pos..end], converter));
            pos = end;
            continue;
        }

        let rest = &input[pos..];
        let end = if rest.starts_with("<!--") {
            find_after(input, pos + 4, "-->")
        } else if rest.starts_with("<![CDATA[") {
            find_after(input, pos + 9, "]]>")
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            find_after(input, pos + 2, ">")
        } else if is_tag_start(bytes, pos) {
            let tag_end = tag_end(bytes, pos + 1);
            match raw_text_element(&input[pos..tag_end]) {
                Some(name) => raw_text_end(input, tag_end, name),
                None => tag_end,
            }
        } else {
            // A stray '<' in text
            let end = input[pos + 1..].find('<').map_or(bytes.len(), |off| pos + 1 + off);
            out.push_str(&convert_text(&input[pos..end], converter));
            pos = end;
            continue;
        };

        out.push_str(&input[pos..end]);
        pos = end;
    }

    out
}

fn is_tag_start(bytes: &[u8], pos: usize) -> bool {
    match bytes.get(pos + 1) {
        Some(b'/') => bytes.get(pos + 2).is_some_and(|b| b.is_ascii_alphabetic()),
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    }
}

/// Index just past the `>` closing a tag, skipping quoted attribute values.
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return start + offset + 1,
                _ => {}
            },
        }
    }
    bytes.len()
}

fn find_after(input: &str, from: usize, terminator: &str) -> usize {
    input
        .get(from..)
        .and_then(|rest| rest.find(terminator))
        .map_or(input.len(), |off| from + off + terminator.len())
}

fn convert_text(text: &str, converter: &dyn ScriptConverter) -> String {
    if text.contains("&#") {
        converter.convert(&decode_numeric_references(text))
    } else {
        converter.convert(text)
    }
}

/// Replace `&#NNNN;` and `&#xHHHH;` with the characters they encode.
///
/// References to `&`, `<` and `>` and malformed references are kept verbatim,
/// so the result is still valid markup. Named entities are left alone.
fn decode_numeric_references(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match parse_numeric_reference(candidate) {
            Some((ch, len)) if !matches!(ch, '&' | '<' | '>') => {
                out.push(ch);
                rest = &candidate[len..];
            }
            _ => {
                out.push_str("&#");
                rest = &candidate[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decoded character and byte length of a reference at the start of `s`.
fn parse_numeric_reference(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix("&#")?;
    let (digits, radix, prefix_len) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16, 3),
        None => (body, 10, 2),
    };
    let semi = digits.find(';')?;
    let number = &digits[..semi];
    if number.is_empty() || !number.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let ch = u32::from_str_radix(number, radix).ok().and_then(char::from_u32)?;
    Some((ch, prefix_len + semi + 1))
}

/// Ends a tag or element name
fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

/// Whether `hay` starts with `name` (ASCII case-insensitive) followed by a name end.
fn starts_with_name(hay: &[u8], name: &str) -> bool {
    hay.get(..name.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(name.as_bytes()))
        && hay.get(name.len()).map_or(true, |&b| is_name_end(b))
}

/// Name of the raw-text element a start tag opens, if any.
fn raw_text_element(tag: &str) -> Option<&'static str> {
    if tag.starts_with("</") || tag.ends_with("/>") {
        return None;
    }
    let name = &tag.as_bytes()[1..];
    RAW_TEXT_ELEMENTS
        .iter()
        .copied()
        .find(|raw| starts_with_name(name, raw))
}

/// Start of the closing tag for a raw-text element, or end of input.
fn raw_text_end(input: &str, from: usize, name: &str) -> usize {
    let hay = input.as_bytes();
    (from..hay.len())
        .find(|&i| hay[i..].starts_with(b"</") && starts_with_name(&hay[i + 2..], name))
        .unwrap_or(hay.len())
}
