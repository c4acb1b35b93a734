use std::fmt;

use crate::error::ConfigError;

/// Points to a part of a [`Code`] buffer.
///
/// A location may span multiple lines. `pointer` is an offset *within* the
/// span marking the column that caused the problem, so a diagnostic for a
/// division by zero can underline the whole expression while the caret sits
/// on the `/` itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CodeLocation {
    /// Absolute byte offset where the span begins.
    pub begin:   usize,
    /// Length of the span in bytes.
    pub length:  usize,
    /// Offset within the span that is the important part.
    pub pointer: usize,
}

impl CodeLocation {
    /// Renders a preview of the lines this location spans.
    ///
    /// Each spanned source line is emitted twice: once with its right-aligned
    /// line number, then as a marker row underlining the span. The column at
    /// `begin + pointer` prints `^`, the first column of the span prints `<`,
    /// the last prints `>`, and interior columns print `~`:
    ///
    /// ```text
    /// 123 | The line that caused an error within it.
    ///     |                      <~~^~~~>
    /// ```
    ///
    /// `padding` shifts the whole block right by that many spaces. Locations
    /// that do not fall inside `code` produce an empty preview.
    #[must_use]
    pub fn preview_text(&self, code: &Code, padding: usize) -> String {
        if code.text.is_empty() || self.length == 0 {
            return String::new();
        }

        let begin_pos = self.begin;
        let end_pos = begin_pos + self.length - 1;
        let pointer_pos = begin_pos + self.pointer;

        let Ok((begin_line, begin_col)) = code.get_line_col(begin_pos) else {
            return String::new();
        };
        let Ok((end_line, end_col_inc)) = code.get_line_col(end_pos) else {
            return String::new();
        };
        let (pointer_line, pointer_col) =
            code.get_line_col(pointer_pos).unwrap_or((begin_line, begin_col));
        let end_col_exc = end_col_inc + 1;

        // Width for the line-number column
        let width = end_line.to_string().len();
        let mut out = String::new();

        for ln in begin_line..=end_line {
            let Ok(line) = code.get_line(ln) else {
                break;
            };

            out.push_str(&" ".repeat(padding));
            out.push_str(&format!("{ln:>width$} | {line}\n"));

            // Marker row
            out.push_str(&" ".repeat(padding));
            out.push_str(&" ".repeat(width));
            out.push_str(" | ");

            let (_, line_len) = code.lines[ln - 1];
            let start = if ln == begin_line { begin_col } else { 0 };
            let end = if ln == end_line { end_col_exc } else { line_len };

            out.push_str(&" ".repeat(start));
            for col in start..end {
                if ln == pointer_line && col == pointer_col {
                    out.push('^');
                } else if ln == begin_line && col == start {
                    out.push('<');
                } else if ln == end_line && col == end - 1 {
                    out.push('>');
                } else {
                    out.push('~');
                }
            }
            out.push('\n');
        }

        out
    }
}

/// Source text of an expression along with reporting utilities.
///
/// Besides the text itself, a code carries a name used to attribute
/// diagnostics (a random eight-hex-digit tag when not supplied) and the
/// byte offsets of every line, computed once at construction so diagnostics
/// can translate byte positions into line and column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// The source text itself.
    pub text:  String,
    /// Name of the code, used to attribute diagnostics.
    pub name:  String,
    /// `(begin, length)` of every line of `text`, in order. The line break
    /// is a single `\n` byte; `\r\n` is not supported.
    pub lines: Vec<(usize, usize)>,
}

impl Code {
    /// Creates a code with a randomly generated name.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_name(text, format!("{:08x}.fxp", rand::random::<u32>()))
    }

    /// Creates a code with an explicit name.
    ///
    /// ## Example
    /// ```
    /// use flexpr::Code;
    ///
    /// let code = Code::with_name("1 + 2\n3 + 4", "demo.fxp");
    /// assert_eq!(code.get_line_col(8).unwrap(), (2, 2));
    /// ```
    #[must_use]
    pub fn with_name(text: impl Into<String>, name: impl Into<String>) -> Self {
        let text = text.into();
        let lines = split_lines(&text);
        Self { text,
               name: name.into(),
               lines }
    }

    /// Gets the 1-based line number and 0-based column number of a byte
    /// position.
    ///
    /// # Errors
    /// Fails with [`ConfigError::OutOfRange`] when the position is past the
    /// end of the text or lands on a line break.
    pub fn get_line_col(&self, pos: usize) -> Result<(usize, usize), ConfigError> {
        for (i, &(begin, length)) in self.lines.iter().enumerate() {
            if pos >= begin && pos < begin + length {
                return Ok((i + 1, pos - begin));
            }
        }

        Err(ConfigError::OutOfRange(format!("position {pos} is out of range")))
    }

    /// Gets a line of the text by its 1-based line number.
    ///
    /// # Errors
    /// Fails with [`ConfigError::OutOfRange`] on an invalid line number.
    pub fn get_line(&self, line_number: usize) -> Result<&str, ConfigError> {
        if line_number == 0 || line_number > self.lines.len() {
            return Err(ConfigError::OutOfRange(format!(
                "line number {line_number} is out of range"
            )));
        }

        let (begin, length) = self.lines[line_number - 1];
        Ok(&self.text[begin..begin + length])
    }

    /// Gets an inclusive range of lines by their 1-based line numbers.
    ///
    /// # Errors
    /// Fails with [`ConfigError::OutOfRange`] on an invalid range.
    pub fn get_lines(&self, begin_ln: usize, end_ln: usize) -> Result<Vec<&str>, ConfigError> {
        if begin_ln == 0 || end_ln > self.lines.len() || begin_ln > end_ln {
            return Err(ConfigError::OutOfRange(format!(
                "line range {begin_ln}..{end_ln} is out of range"
            )));
        }

        let mut result = Vec::with_capacity(end_ln - begin_ln + 1);
        for i in begin_ln - 1..end_ln {
            let (begin, length) = self.lines[i];
            result.push(&self.text[begin..begin + length]);
        }

        Ok(result)
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Splits the text into `(begin, length)` line spans. A trailing `\n`
/// produces a final empty line, matching how editors count lines.
fn split_lines(text: &str) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut begin = 0;
    let mut end = 0;

    while end < text.len() {
        end = match text[begin..].find('\n') {
            Some(offset) => begin + offset,
            None => text.len(),
        };
        lines.push((begin, end - begin));
        begin = end + 1;
    }

    lines
}
