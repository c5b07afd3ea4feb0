//! Streaming parser for the region-scoped notes XML feed.
//!
//! The feed is a flat sequence of `<note lon=".." lat="..">` elements, each
//! holding an optional `<id>`, a `<status>`, and any number of `<comment>`
//! blocks with `<date>`, `<user>`, and `<text>` children. Every other element
//! is skipped.
//!
//! Any malformed input (bad XML, missing coordinates, non-numeric id, a
//! comment outside a note) fails the whole parse.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use mapnotes_core::{CommentRecord, Error, NoteRecord, Result};

/// Elements the parser acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Note,
    Status,
    Id,
    Comment,
    Field(CommentField),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentField {
    Date,
    User,
    Text,
}

impl Tag {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"note" => Tag::Note,
            b"status" => Tag::Status,
            b"id" => Tag::Id,
            b"comment" => Tag::Comment,
            b"date" => Tag::Field(CommentField::Date),
            b"user" => Tag::Field(CommentField::User),
            b"text" => Tag::Field(CommentField::Text),
            _ => Tag::Other,
        }
    }

    fn name(&self) -> &'static [u8] {
        match self {
            Tag::Note => b"note",
            Tag::Status => b"status",
            Tag::Id => b"id",
            Tag::Comment => b"comment",
            Tag::Field(CommentField::Date) => b"date",
            Tag::Field(CommentField::User) => b"user",
            Tag::Field(CommentField::Text) => b"text",
            Tag::Other => b"",
        }
    }
}

/// Cursor over the notes being built.
#[derive(Debug, Default)]
struct ParseState {
    notes: Vec<NoteRecord>,
    /// Index of the open `<note>` in `notes`.
    current: Option<usize>,
    /// Index of the open `<comment>` within the current note.
    comment: Option<usize>,
}

impl ParseState {
    fn open_note(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let longitude = required_attribute(start, "lon")?.trim().parse::<f64>()?;
        let latitude = required_attribute(start, "lat")?.trim().parse::<f64>()?;

        // Records are visible in the output as soon as they open.
        self.notes.push(NoteRecord::new_at(latitude, longitude));
        self.current = Some(self.notes.len() - 1);
        self.comment = None;
        Ok(())
    }

    fn close_note(&mut self) {
        self.current = None;
        self.comment = None;
    }

    fn current_note(&mut self) -> Option<&mut NoteRecord> {
        self.current.and_then(|i| self.notes.get_mut(i))
    }

    fn open_comment(&mut self) -> Result<()> {
        let note = self
            .current_note()
            .ok_or_else(|| Error::Feed("<comment> outside of <note>".to_string()))?;
        note.comments.push(CommentRecord::default());
        let index = note.comments.len() - 1;
        self.comment = Some(index);
        Ok(())
    }

    fn current_comment(&mut self) -> Option<&mut CommentRecord> {
        let index = self.comment?;
        self.current_note()?.comments.get_mut(index)
    }

    fn finish(mut self) -> Vec<NoteRecord> {
        for note in &mut self.notes {
            note.derive_description();
        }
        self.notes
    }
}

/// Parse a notes feed into records, in document order.
pub fn parse_notes<R: BufRead>(input: R) -> Result<Vec<NoteRecord>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut text_buf = Vec::new();
    let mut state = ParseState::default();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(&reader, e))?;
        let (tag, empty) = match event {
            Event::Start(start) => {
                let tag = Tag::from_name(start.local_name().as_ref());
                if tag == Tag::Note {
                    state.open_note(&start)?;
                }
                (tag, false)
            }
            Event::Empty(start) => {
                let tag = Tag::from_name(start.local_name().as_ref());
                if tag == Tag::Note {
                    state.open_note(&start)?;
                }
                (tag, true)
            }
            Event::End(end) => {
                match Tag::from_name(end.local_name().as_ref()) {
                    Tag::Note => state.close_note(),
                    Tag::Comment => state.comment = None,
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Event::Eof => break,
            _ => {
                buf.clear();
                continue;
            }
        };
        buf.clear();

        match tag {
            Tag::Note => {
                if empty {
                    state.close_note();
                }
            }
            Tag::Status if state.current.is_some() => {
                let status = element_text(&mut reader, &mut text_buf, tag, empty)?;
                if let Some(note) = state.current_note() {
                    note.opened = status.trim() == "open";
                }
            }
            Tag::Id if state.current.is_some() => {
                let id = element_text(&mut reader, &mut text_buf, tag, empty)?
                    .trim()
                    .parse::<i64>()?;
                if let Some(note) = state.current_note() {
                    note.id = id;
                }
            }
            Tag::Comment => {
                state.open_comment()?;
                if empty {
                    state.comment = None;
                }
            }
            Tag::Field(field) if state.comment.is_some() => {
                let value = element_text(&mut reader, &mut text_buf, tag, empty)?;
                if let Some(comment) = state.current_comment() {
                    match field {
                        CommentField::Date => comment.date = value,
                        CommentField::User => comment.user = value,
                        CommentField::Text => comment.text = value,
                    }
                }
            }
            _ => {}
        }
    }

    let notes = state.finish();
    trace!(count = notes.len(), "Parsed notes feed");
    Ok(notes)
}

/// Parse a feed held in memory.
pub fn parse_notes_str(xml: &str) -> Result<Vec<NoteRecord>> {
    parse_notes(xml.as_bytes())
}

/// Collect the text content up to the closing tag of `tag`.
fn element_text<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    tag: Tag,
    empty: bool,
) -> Result<String> {
    let mut text = String::new();
    if empty {
        return Ok(text);
    }
    loop {
        let event = reader
            .read_event_into(buf)
            .map_err(|e| xml_error(&*reader, e))?;
        match event {
            Event::End(end) if end.local_name().as_ref() == tag.name() => break,
            Event::Text(t) => {
                let chunk = t.unescape().map_err(|e| xml_error(&*reader, e))?;
                text.push_str(&chunk);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    buf.clear();
    Ok(text)
}

fn required_attribute(start: &BytesStart<'_>, name: &str) -> Result<String> {
    let attr = start
        .try_get_attribute(name)
        .map_err(|e| Error::Feed(format!("bad attribute on <note>: {}", e)))?
        .ok_or_else(|| Error::Feed(format!("<note> missing {} attribute", name)))?;
    let value = attr
        .unescape_value()
        .map_err(|e| Error::Feed(format!("bad {} attribute: {}", name, e)))?;
    Ok(value.into_owned())
}

fn xml_error<R>(reader: &Reader<R>, e: impl std::fmt::Display) -> Error {
    Error::Feed(format!(
        "XML error at byte {}: {}",
        reader.buffer_position(),
        e
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="OpenStreetMap server">
<note lon="13.4050" lat="52.5200">
  <id>4242</id>
  <url>https://api.openstreetmap.org/api/0.6/notes/4242</url>
  <date_created>2024-05-01 10:00:00 UTC</date_created>
  <status>open</status>
  <comments>
    <comment>
      <date>2024-05-01 10:00:00 UTC</date>
      <uid>7</uid>
      <user>alice</user>
      <action>opened</action>
      <text>Footpath blocked by construction</text>
      <html>&lt;p&gt;Footpath blocked by construction&lt;/p&gt;</html>
    </comment>
    <comment>
      <date>2024-05-02 08:30:00 UTC</date>
      <user>bob</user>
      <action>commented</action>
      <text>Still blocked &amp; unsigned</text>
    </comment>
  </comments>
</note>
<note lon="-0.1276" lat="51.5072">
  <id>17</id>
  <status>closed</status>
  <comments/>
</note>
</osm>"#;

    #[test]
    fn test_parse_notes_reads_records_in_order() {
        let notes = parse_notes_str(FEED).unwrap();
        assert_eq!(notes.len(), 2);

        assert_eq!(notes[0].id, 4242);
        assert_eq!(notes[0].latitude, 52.52);
        assert_eq!(notes[0].longitude, 13.405);
        assert!(notes[0].opened);

        assert_eq!(notes[1].id, 17);
        assert_eq!(notes[1].latitude, 51.5072);
        assert!(!notes[1].opened);
        assert!(notes[1].comments.is_empty());
    }

    #[test]
    fn test_parse_notes_derives_description() {
        let notes = parse_notes_str(FEED).unwrap();
        let note = &notes[0];
        assert_eq!(
            note.description.as_deref(),
            Some("Footpath blocked by construction")
        );
        assert_eq!(
            note.type_name.as_deref(),
            Some("2024-05-01 10:00:00 UTC alice")
        );
        // Short first comment folded into the description
        assert_eq!(note.comments.len(), 1);
        assert_eq!(note.comments[0].user, "bob");
        assert_eq!(note.comments[0].text, "Still blocked & unsigned");
    }

    #[test]
    fn test_parse_notes_defaults_to_open_without_status() {
        let xml = r#"<osm><note lon="1" lat="2"><id>5</id></note></osm>"#;
        let notes = parse_notes_str(xml).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].opened);
    }

    #[test]
    fn test_parse_notes_last_status_wins() {
        let xml = r#"<osm><note lon="1" lat="2"><status>closed</status><status>open</status></note></osm>"#;
        let notes = parse_notes_str(xml).unwrap();
        assert!(notes[0].opened);
    }

    #[test]
    fn test_parse_notes_keeps_long_first_comment() {
        let long = "a".repeat(150);
        let xml = format!(
            r#"<osm><note lon="1" lat="2"><comments><comment><text>{}</text></comment><comment><text>reply</text></comment></comments></note></osm>"#,
            long
        );
        let notes = parse_notes_str(&xml).unwrap();
        assert_eq!(notes[0].comments.len(), 2);
        assert_eq!(notes[0].description.as_deref(), Some(long.as_str()));
    }

    #[test]
    fn test_parse_notes_self_closing_note() {
        let xml = r#"<osm><note lon="3.5" lat="4.5"/><note lon="5" lat="6"><id>9</id></note></osm>"#;
        let notes = parse_notes_str(xml).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, 0);
        assert_eq!(notes[0].longitude, 3.5);
        assert_eq!(notes[1].id, 9);
    }

    #[test]
    fn test_parse_notes_ignores_fields_outside_comment() {
        let xml = r#"<osm><note lon="1" lat="2"><user>stray</user><comments><comment><user>real</user></comment></comments></note></osm>"#;
        let notes = parse_notes_str(xml).unwrap();
        // Empty text folds into description and is removed
        assert_eq!(notes[0].type_name.as_deref(), Some(" real"));
        assert!(notes[0].comments.is_empty());
    }

    #[test]
    fn test_parse_notes_comment_indexes_reset_per_note() {
        let xml = r#"<osm>
            <note lon="1" lat="1"><comment><text>a</text></comment><comment><text>b</text></comment></note>
            <note lon="2" lat="2"><comment><text>c</text></comment></note>
        </osm>"#;
        let notes = parse_notes_str(xml).unwrap();
        assert_eq!(notes[0].description.as_deref(), Some("a"));
        assert_eq!(notes[0].comments.len(), 1);
        assert_eq!(notes[1].description.as_deref(), Some("c"));
        assert!(notes[1].comments.is_empty());
    }

    #[test]
    fn test_parse_notes_missing_attribute_fails() {
        let xml = r#"<osm><note lon="1"><id>1</id></note></osm>"#;
        let err = parse_notes_str(xml).unwrap_err();
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn test_parse_notes_non_numeric_id_fails_whole_feed() {
        let xml = r#"<osm><note lon="1" lat="1"><id>1</id></note><note lon="2" lat="2"><id>x1</id></note></osm>"#;
        assert!(matches!(parse_notes_str(xml), Err(Error::Feed(_))));
    }

    #[test]
    fn test_parse_notes_non_numeric_coordinate_fails() {
        let xml = r#"<osm><note lon="east" lat="1"/></osm>"#;
        assert!(parse_notes_str(xml).is_err());
    }

    #[test]
    fn test_parse_notes_comment_outside_note_fails() {
        let xml = r#"<osm><comment><text>orphan</text></comment><note lon="1" lat="1"/></osm>"#;
        let err = parse_notes_str(xml).unwrap_err();
        assert!(err.to_string().contains("outside of <note>"));
    }

    #[test]
    fn test_parse_notes_mismatched_tags_fail() {
        let xml = r#"<osm><note lon="1" lat="1"><id>1</status></note></osm>"#;
        assert!(parse_notes_str(xml).is_err());
    }

    #[test]
    fn test_parse_notes_empty_document() {
        let notes = parse_notes_str(r#"<osm version="0.6"></osm>"#).unwrap();
        assert!(notes.is_empty());
    }
}
