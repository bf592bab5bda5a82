//! quick-xml plumbing shared by the publisher parsers.
//!
//! The parsers walk each document as an event stream. quick-xml checks tag
//! pairing but not document shape, so [`Shape`] adds the checks that make a
//! truncated or multi-rooted file a [`MalformedDocument`].

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::MalformedDocument;

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;
pub(crate) type XmlResult<T> = Result<T, MalformedDocument>;

/// Best-effort UTF-8 decoding; invalid sequences become U+FFFD.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

pub(crate) fn reader(xml: &str) -> XmlReader<'_> {
    // whitespace is kept so mixed content and byte offsets stay intact
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

pub(crate) fn position(reader: &XmlReader<'_>) -> u64 {
    reader.buffer_position() as u64
}

pub(crate) fn malformed(reader: &XmlReader<'_>, err: impl std::fmt::Display) -> MalformedDocument {
    MalformedDocument::new(position(reader), err.to_string())
}

pub(crate) fn next_event<'b>(
    reader: &mut XmlReader<'_>,
    buf: &'b mut Vec<u8>,
) -> XmlResult<Event<'b>> {
    reader.read_event_into(buf).map_err(|e| malformed(reader, e))
}

/// Unescaped value of attribute `key`, if present.
pub(crate) fn attribute(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
    key: &[u8],
) -> XmlResult<Option<String>> {
    match e.try_get_attribute(key) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|err| malformed(reader, err)),
        Ok(None) => Ok(None),
        Err(err) => Err(malformed(reader, err)),
    }
}

/// Whether attribute `key` is present with exactly `value`.
pub(crate) fn has_attribute(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
    key: &[u8],
    value: &str,
) -> XmlResult<bool> {
    Ok(attribute(reader, e, key)?.as_deref() == Some(value))
}

/// Trimmed text, or `None` when nothing but whitespace is left.
pub(crate) fn non_empty(text: impl AsRef<str>) -> Option<String> {
    let trimmed = text.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Consume everything up to and including the end tag of the element just opened.
pub(crate) fn skip_element(reader: &mut XmlReader<'_>, end_tag: &[u8]) -> XmlResult<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => return Err(unexpected_eof(reader, end_tag)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Concatenated text of the element just opened, nested markup included.
pub(crate) fn read_text_content(reader: &mut XmlReader<'_>, end_tag: &[u8]) -> XmlResult<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match next_event(reader, &mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape().map_err(|err| malformed(reader, err))?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => return Err(unexpected_eof(reader, end_tag)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn unexpected_eof(reader: &XmlReader<'_>, end_tag: &[u8]) -> MalformedDocument {
    malformed(
        reader,
        format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(end_tag)
        ),
    )
}

/// Document-level shape: exactly one root element, everything closed.
#[derive(Debug, Default)]
pub(crate) struct Shape {
    depth: usize,
    roots: usize,
}

impl Shape {
    pub(crate) fn open(&mut self, reader: &XmlReader<'_>) -> XmlResult<()> {
        self.leaf(reader)?;
        self.depth += 1;
        Ok(())
    }

    /// A self-closing element.
    pub(crate) fn leaf(&mut self, reader: &XmlReader<'_>) -> XmlResult<()> {
        if self.depth == 0 {
            self.roots += 1;
            if self.roots > 1 {
                return Err(malformed(reader, "content after the root element"));
            }
        }
        Ok(())
    }

    pub(crate) fn close(&mut self, reader: &XmlReader<'_>) -> XmlResult<()> {
        if self.depth == 0 {
            return Err(malformed(reader, "end tag without matching start tag"));
        }
        self.depth -= 1;
        Ok(())
    }

    pub(crate) fn text(&self, reader: &XmlReader<'_>, raw: &[u8]) -> XmlResult<()> {
        if self.depth == 0 && !raw.iter().all(u8::is_ascii_whitespace) {
            return Err(malformed(reader, "text outside the root element"));
        }
        Ok(())
    }

    pub(crate) fn finish(&self, reader: &XmlReader<'_>) -> XmlResult<()> {
        if self.roots == 0 {
            return Err(malformed(reader, "no root element"));
        }
        if self.depth > 0 {
            return Err(malformed(reader, "unexpected end of document"));
        }
        Ok(())
    }
}

/// What a [`walk`] visitor did with the element it was shown.
pub(crate) enum Visit {
    /// Keep walking into the element's children
    Descend,
    /// The visitor read through the element's end tag itself
    Consumed,
}

/// Walk every element of `xml` in document order.
///
/// The visitor sees the reader, the opening tag, the names of the open
/// ancestors (root first) and whether the element is self-closing. A visitor
/// that reads the element's content must return [`Visit::Consumed`].
pub(crate) fn walk<F>(xml: &str, mut visit: F) -> XmlResult<()>
where
    F: FnMut(&mut XmlReader<'_>, &BytesStart<'_>, &[Vec<u8>], bool) -> XmlResult<Visit>,
{
    let mut reader = reader(xml);
    let mut shape = Shape::default();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match next_event(&mut reader, &mut buf)? {
            Event::Start(e) => {
                shape.open(&reader)?;
                match visit(&mut reader, &e, &path, false)? {
                    Visit::Descend => path.push(e.name().as_ref().to_vec()),
                    Visit::Consumed => shape.close(&reader)?,
                }
            }
            Event::Empty(e) => {
                shape.leaf(&reader)?;
                visit(&mut reader, &e, &path, true)?;
            }
            Event::End(_) => {
                shape.close(&reader)?;
                path.pop();
            }
            Event::Text(e) => shape.text(&reader, &e)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    shape.finish(&reader)
}

/// Whether the innermost open ancestor is `name`.
pub(crate) fn parent_is(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.last().is_some_and(|p| p.as_slice() == name)
}
