/// HTML token scanner — splits document text into classified spans.
///
/// The scanner is forgiving: every byte of the input belongs to exactly one
/// token, and malformed markup degrades to `Unknown` tokens rather than
/// errors. Offsets are byte offsets into the source.

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Classification of a span of markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<!--`
    StartCommentTag,
    Comment,
    /// `-->`
    EndCommentTag,
    /// `<`
    StartTagOpen,
    /// Element name after `<`.
    StartTag,
    /// `>`
    StartTagClose,
    /// `/>`
    StartTagSelfClose,
    /// `</`
    EndTagOpen,
    /// Element name after `</`.
    EndTag,
    /// `>` closing an end tag.
    EndTagClose,
    AttributeName,
    /// `=`
    DelimiterAssign,
    /// Attribute value, quotes included when present.
    AttributeValue,
    /// `<!DOCTYPE ...>` and other `<!...>` declarations.
    Doctype,
    Content,
    /// Body of `<script>` or `<style>`.
    RawText,
    Whitespace,
    Unknown,
}

/// A classified span `[start, end)` of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    WithinContent,
    AfterOpeningStartTag,
    WithinTag,
    AfterAttributeName,
    BeforeAttributeValue,
    AfterOpeningEndTag,
    WithinEndTag,
    WithinComment,
    WithinRawText,
}

/// Iterator over the tokens of an HTML document.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    state: ScanState,
    /// Lower-cased name of the start tag being scanned.
    last_tag: String,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            state: ScanState::WithinContent,
            last_tag: String::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(idx, _)| idx);
        self.pos += len;
        len
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_tag_name(&mut self) -> usize {
        match self.rest().chars().next() {
            Some(c) if is_tag_name_start(c) => {
                self.pos += c.len_utf8();
                c.len_utf8() + self.advance_while(is_tag_name_char)
            }
            _ => 0,
        }
    }

    /// Consume at least one byte and classify it. Called with input left.
    fn scan(&mut self) -> TokenKind {
        loop {
            match self.state {
                ScanState::WithinContent => return self.scan_content(),
                ScanState::AfterOpeningStartTag => {
                    let start = self.pos;
                    if self.advance_tag_name() > 0 {
                        self.last_tag = self.source[start..self.pos].to_ascii_lowercase();
                        self.state = ScanState::WithinTag;
                        return TokenKind::StartTag;
                    }
                    self.last_tag.clear();
                    self.state = ScanState::WithinTag;
                }
                ScanState::WithinTag => return self.scan_within_tag(),
                ScanState::AfterAttributeName => {
                    if self.advance_while(char::is_whitespace) > 0 {
                        return TokenKind::Whitespace;
                    }
                    if self.rest().starts_with('=') {
                        self.pos += 1;
                        self.state = ScanState::BeforeAttributeValue;
                        return TokenKind::DelimiterAssign;
                    }
                    self.state = ScanState::WithinTag;
                }
                ScanState::BeforeAttributeValue => {
                    if self.advance_while(char::is_whitespace) > 0 {
                        return TokenKind::Whitespace;
                    }
                    self.state = ScanState::WithinTag;
                    if self.advance_attribute_value() {
                        return TokenKind::AttributeValue;
                    }
                }
                ScanState::AfterOpeningEndTag => {
                    if self.advance_tag_name() > 0 {
                        self.state = ScanState::WithinEndTag;
                        return TokenKind::EndTag;
                    }
                    if self.advance_while(char::is_whitespace) > 0 {
                        return TokenKind::Whitespace;
                    }
                    self.state = ScanState::WithinEndTag;
                }
                ScanState::WithinEndTag => return self.scan_within_end_tag(),
                ScanState::WithinComment => {
                    if self.rest().starts_with(COMMENT_CLOSE) {
                        self.pos += COMMENT_CLOSE.len();
                        self.state = ScanState::WithinContent;
                        return TokenKind::EndCommentTag;
                    }
                    self.pos += self.rest().find(COMMENT_CLOSE).unwrap_or(self.rest().len());
                    return TokenKind::Comment;
                }
                ScanState::WithinRawText => {
                    let close = find_close_tag(self.rest(), &self.last_tag);
                    match close {
                        Some(0) => self.state = ScanState::WithinContent,
                        Some(len) => {
                            self.pos += len;
                            self.state = ScanState::WithinContent;
                            return TokenKind::RawText;
                        }
                        None => {
                            self.pos = self.source.len();
                            return TokenKind::RawText;
                        }
                    }
                }
            }
        }
    }

    fn scan_content(&mut self) -> TokenKind {
        let rest = self.rest();
        if rest.starts_with(COMMENT_OPEN) {
            self.pos += COMMENT_OPEN.len();
            self.state = ScanState::WithinComment;
            return TokenKind::StartCommentTag;
        }
        if rest.starts_with("<!") {
            self.pos += rest.find('>').map_or(rest.len(), |idx| idx + 1);
            return TokenKind::Doctype;
        }
        if rest.starts_with("</") {
            self.pos += 2;
            self.state = ScanState::AfterOpeningEndTag;
            return TokenKind::EndTagOpen;
        }
        if rest.starts_with('<') {
            self.pos += 1;
            self.state = ScanState::AfterOpeningStartTag;
            return TokenKind::StartTagOpen;
        }
        self.pos += rest.find('<').unwrap_or(rest.len());
        TokenKind::Content
    }

    fn scan_within_tag(&mut self) -> TokenKind {
        if self.advance_while(char::is_whitespace) > 0 {
            return TokenKind::Whitespace;
        }
        let rest = self.rest();
        if rest.starts_with("/>") {
            self.pos += 2;
            self.state = ScanState::WithinContent;
            return TokenKind::StartTagSelfClose;
        }
        if rest.starts_with('>') {
            self.pos += 1;
            self.state = if is_raw_text_element(&self.last_tag) {
                ScanState::WithinRawText
            } else {
                ScanState::WithinContent
            };
            return TokenKind::StartTagClose;
        }
        if rest.starts_with('<') {
            // Unclosed tag; `<` opens the next one.
            self.state = ScanState::WithinContent;
            return self.scan_content();
        }
        if self.advance_while(is_attribute_name_char) > 0 {
            self.state = ScanState::AfterAttributeName;
            return TokenKind::AttributeName;
        }
        self.advance_char();
        TokenKind::Unknown
    }

    fn scan_within_end_tag(&mut self) -> TokenKind {
        if self.advance_while(char::is_whitespace) > 0 {
            return TokenKind::Whitespace;
        }
        let rest = self.rest();
        if rest.starts_with('>') {
            self.pos += 1;
            self.state = ScanState::WithinContent;
            return TokenKind::EndTagClose;
        }
        if rest.starts_with('<') {
            self.state = ScanState::WithinContent;
            return self.scan_content();
        }
        if self.advance_while(|c| !c.is_whitespace() && c != '>' && c != '<') == 0 {
            self.advance_char();
        }
        TokenKind::Unknown
    }

    /// A quoted value must close on the same line; otherwise nothing is
    /// consumed and the quote is left for the tag scanner.
    fn advance_attribute_value(&mut self) -> bool {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|&c| c == '"' || c == '\'') {
            let body = &rest[1..];
            return match body.find(|c: char| c == quote || c == '\n' || c == '\r') {
                Some(idx) if body[idx..].starts_with(quote) => {
                    self.pos += idx + 2;
                    true
                }
                _ => false,
            };
        }
        self.advance_while(is_unquoted_value_char) > 0
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.source.len() {
            return None;
        }
        let start = self.pos;
        let kind = self.scan();
        if self.pos == start {
            // Keep the iterator moving on unexpected input.
            self.advance_char();
            return Some(Token {
                kind: TokenKind::Unknown,
                start,
                end: self.pos,
            });
        }
        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }
}

fn is_tag_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_tag_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

fn is_attribute_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
}

fn is_unquoted_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '`' | '=' | '<' | '>')
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Byte offset of the `</tag` that ends a raw text element, compared
/// case-insensitively. The name must end there: `</scripts` does not close
/// `script`.
fn find_close_tag(haystack: &str, tag: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let needle_len = tag.len() + 2;
    let mut i = 0;
    while i + needle_len <= bytes.len() {
        let rel = bytes[i..].iter().position(|&b| b == b'<')?;
        i += rel;
        if i + needle_len > bytes.len() {
            return None;
        }
        let name_ends = bytes
            .get(i + needle_len)
            .map_or(true, |&b| b.is_ascii_whitespace() || b == b'/' || b == b'>');
        if bytes[i + 1] == b'/'
            && bytes[i + 2..i + needle_len].eq_ignore_ascii_case(tag.as_bytes())
            && name_ends
        {
            return Some(i);
        }
        i += 1;
    }
    None
}
