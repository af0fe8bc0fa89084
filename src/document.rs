use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

/// An open markup document: its URI, text, and line index.
///
/// Offsets are byte offsets into [`TextDocument::text`]. Positions follow LSP:
/// zero-based lines, characters counted in UTF-16 code units.
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: String,
    language_id: String,
    version: i32,
    text: String,
    rope: Rope,
}

impl TextDocument {
    pub fn new(
        uri: impl Into<String>,
        language_id: impl Into<String>,
        version: i32,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version,
            text,
            rope,
        }
    }

    /// The document's own identifier; the base for relative references.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to it.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let char_idx = self.rope.byte_to_char(offset);
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let character =
            self.rope.char_to_utf16_cu(char_idx) - self.rope.char_to_utf16_cu(line_start);
        Position::new(line as u32, character as u32)
    }

    /// Convert a position to a byte offset. A character past the end of its
    /// line clamps before the line break; a line past the end clamps to the
    /// end of the document.
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return self.text.len();
        }
        let line_start = self.rope.line_to_char(line);
        let line_end = line_start + self.line_content_chars(line);
        let start_cu = self.rope.char_to_utf16_cu(line_start);
        let end_cu = self.rope.char_to_utf16_cu(line_end);
        let cu = (start_cu + position.character as usize).min(end_cu);
        self.rope.char_to_byte(self.rope.utf16_cu_to_char(cu))
    }

    /// Length of `line` in chars, without its line break.
    fn line_content_chars(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        } else if len > 0 && is_line_break(slice.char(len - 1)) {
            len -= 1;
        }
        len
    }

    pub fn range(&self, start: usize, end: usize) -> Range {
        Range::new(self.position_at(start), self.position_at(end))
    }

    /// Apply an incremental edit, or replace the whole text when `range` is `None`.
    pub fn apply_change(&mut self, range: Option<Range>, text: &str) {
        match range {
            Some(range) => {
                let start = self.rope.byte_to_char(self.offset_at(range.start));
                let end = self.rope.byte_to_char(self.offset_at(range.end)).max(start);
                self.rope.remove(start..end);
                self.rope.insert(start, text);
                self.text = self.rope.to_string();
            }
            None => {
                self.text = text.to_string();
                self.rope = Rope::from_str(text);
            }
        }
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

/// Single-char line breaks, as ropey splits lines.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_count_utf16_units() {
        let doc = TextDocument::new("test://a.html", "html", 0, "a\n\u{1F600}<b>");
        assert_eq!(doc.position_at(0), Position::new(0, 0));
        assert_eq!(doc.position_at(2), Position::new(1, 0));
        // The emoji is four bytes and two UTF-16 units.
        assert_eq!(doc.position_at(6), Position::new(1, 2));
        assert_eq!(doc.position_at(100), Position::new(1, 5));
    }

    #[test]
    fn offset_round_trips_and_clamps() {
        let doc = TextDocument::new("", "html", 0, "ab\ncd");
        assert_eq!(doc.offset_at(Position::new(1, 1)), 4);
        assert_eq!(doc.offset_at(Position::new(0, 99)), 2);
        assert_eq!(doc.offset_at(Position::new(1, 99)), 5);
        assert_eq!(doc.offset_at(Position::new(9, 0)), 5);

        let doc = TextDocument::new("", "html", 0, "ab\r\ncd\ref");
        assert_eq!(doc.offset_at(Position::new(0, 99)), 2);
        assert_eq!(doc.offset_at(Position::new(1, 99)), 6);
        assert_eq!(doc.offset_at(Position::new(2, 99)), 9);
    }

    #[test]
    fn edit_past_line_end_stays_on_its_line() {
        let mut doc = TextDocument::new("", "html", 0, "ab\ncd");
        let end_of_line = Position::new(0, 99);
        doc.apply_change(Some(Range::new(end_of_line, end_of_line)), "X");
        assert_eq!(doc.text(), "abX\ncd");

        let mut doc = TextDocument::new("", "html", 0, "ab\r\ncd");
        doc.apply_change(
            Some(Range::new(Position::new(0, 1), Position::new(0, 99))),
            "",
        );
        assert_eq!(doc.text(), "a\r\ncd");
    }

    #[test]
    fn incremental_edit() {
        let mut doc = TextDocument::new("", "html", 0, "<a href=\"x\">\n<b>");
        doc.apply_change(
            Some(Range::new(Position::new(0, 9), Position::new(0, 10))),
            "y.html",
        );
        assert_eq!(doc.text(), "<a href=\"y.html\">\n<b>");
        doc.apply_change(None, "<p>");
        assert_eq!(doc.text(), "<p>");
        assert_eq!(doc.position_at(3), Position::new(0, 3));
    }
}
