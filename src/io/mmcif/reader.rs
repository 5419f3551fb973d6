//! mmCIF reader that flattens the first data block into a [`FieldTable`].
//!
//! The reader walks the text line by line, tokenizes quoted and bare values, stitches
//! `;`-delimited text fields back together, and distributes `loop_` values across their
//! column headers. Loop rows may wrap across any number of lines; only the total value count
//! of a loop is validated against its header width.

use crate::io::error::Error;
use crate::io::table::FieldTable;
use std::io::BufRead;

const FORMAT: &str = "mmCIF";

/// A single lexical token; quoted tokens are always values, never keywords or item names.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }
}

/// DFA states for the block parser.
///
/// Tracks whether the parser is outside loops, consuming loop headers, or distributing loop
/// values so each token is routed to the right column.
enum ParserState {
    Base,
    InLoopHeader,
    InLoop,
}

/// Accumulates tokens into a [`FieldTable`].
struct TableBuilder {
    table: FieldTable,
    state: ParserState,
    pending_key: Option<(String, usize)>,
    loop_headers: Vec<String>,
    loop_value_count: usize,
    loop_start_line: usize,
    seen_block: bool,
    finished: bool,
}

/// Parses mmCIF text into a [`FieldTable`].
///
/// Only the first `data_` block is read; anything after a second block header is ignored.
/// Text without any `data_` header is accepted and yields a table without a block name.
///
/// # Arguments
///
/// * `reader` - Any buffered reader that yields mmCIF text.
///
/// # Errors
///
/// Returns [`Error::Parse`] for unterminated quotes or text fields, items without values,
/// and stray values; [`Error::InconsistentData`] when a loop's value count is not a multiple
/// of its column count; [`Error::Io`] when `reader` fails.
pub fn read<R: BufRead>(reader: R) -> Result<FieldTable, Error> {
    let mut builder = TableBuilder::new();
    let mut text_field: Option<(usize, Vec<String>)> = None;
    let mut line_num = 0;

    for line in reader.lines() {
        line_num += 1;
        let line = line.map_err(|e| Error::from_io(e, None))?;

        if let Some((start_line, mut lines)) = text_field.take() {
            if let Some(rest) = line.strip_prefix(';') {
                builder.accept(Token::quoted(lines.join("\n")), start_line)?;
                for token in tokenize_line(rest, line_num)? {
                    builder.accept(token, line_num)?;
                }
            } else {
                lines.push(line);
                text_field = Some((start_line, lines));
            }
        } else if let Some(rest) = line.strip_prefix(';') {
            text_field = Some((line_num, vec![rest.to_string()]));
        } else {
            for token in tokenize_line(&line, line_num)? {
                builder.accept(token, line_num)?;
                if builder.finished {
                    break;
                }
            }
        }

        if builder.finished {
            break;
        }
    }

    if let Some((start_line, _)) = text_field {
        return Err(Error::parse(
            FORMAT,
            None,
            start_line,
            "unterminated ';' text field",
        ));
    }

    builder.finish()
}

/// Splits one line into tokens.
///
/// A quote only closes a quoted value when followed by whitespace or the end of the line,
/// so primes inside names such as `"O5'"` survive intact. A `#` outside a value starts a
/// comment that runs to the end of the line.
fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        if c == '\'' || c == '"' {
            let start = i + 1;
            let mut end = start;
            loop {
                if end >= chars.len() {
                    return Err(Error::parse(
                        FORMAT,
                        None,
                        line_num,
                        format!("unterminated {c}-quoted value"),
                    ));
                }
                if chars[end] == c && chars.get(end + 1).is_none_or(|next| next.is_whitespace())
                {
                    break;
                }
                end += 1;
            }
            tokens.push(Token::quoted(chars[start..end].iter().collect::<String>()));
            i = end + 1;
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(Token::bare(chars[start..i].iter().collect::<String>()));
        }
    }

    Ok(tokens)
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            table: FieldTable::new(),
            state: ParserState::Base,
            pending_key: None,
            loop_headers: Vec::new(),
            loop_value_count: 0,
            loop_start_line: 0,
            seen_block: false,
            finished: false,
        }
    }

    fn accept(&mut self, token: Token, line_num: usize) -> Result<(), Error> {
        if !token.quoted {
            let lower = token.text.to_ascii_lowercase();

            if let Some(name) = lower.strip_prefix("data_") {
                self.close_loop()?;
                self.ensure_no_pending_key()?;
                if self.seen_block {
                    self.finished = true;
                } else {
                    self.seen_block = true;
                    let name_len = name.len();
                    let original = &token.text[token.text.len() - name_len..];
                    self.table.set_block_name(original);
                }
                return Ok(());
            }

            if lower == "loop_" {
                self.close_loop()?;
                self.ensure_no_pending_key()?;
                self.state = ParserState::InLoopHeader;
                self.loop_start_line = line_num;
                return Ok(());
            }

            if token.text.starts_with('_') {
                match self.state {
                    ParserState::InLoopHeader => {
                        self.loop_headers.push(token.text);
                        return Ok(());
                    }
                    ParserState::InLoop => self.close_loop()?,
                    ParserState::Base => {}
                }
                self.ensure_no_pending_key()?;
                self.pending_key = Some((token.text, line_num));
                return Ok(());
            }
        }

        match self.state {
            ParserState::Base => match self.pending_key.take() {
                Some((key, _)) => {
                    self.table.insert(key, vec![token.text]);
                    Ok(())
                }
                None => Err(Error::parse(
                    FORMAT,
                    None,
                    line_num,
                    format!("value '{}' does not belong to any data item", token.text),
                )),
            },
            ParserState::InLoopHeader => {
                if self.loop_headers.is_empty() {
                    return Err(Error::parse(
                        FORMAT,
                        None,
                        line_num,
                        "loop_ has no column headers",
                    ));
                }
                for header in &self.loop_headers {
                    self.table.insert(header.clone(), Vec::new());
                }
                self.state = ParserState::InLoop;
                self.push_loop_value(token.text);
                Ok(())
            }
            ParserState::InLoop => {
                self.push_loop_value(token.text);
                Ok(())
            }
        }
    }

    fn push_loop_value(&mut self, value: String) {
        let column = &self.loop_headers[self.loop_value_count % self.loop_headers.len()];
        self.table.push(column, value);
        self.loop_value_count += 1;
    }

    fn close_loop(&mut self) -> Result<(), Error> {
        match self.state {
            ParserState::InLoop => {
                let width = self.loop_headers.len();
                if self.loop_value_count % width != 0 {
                    return Err(Error::inconsistent_data(
                        FORMAT,
                        None,
                        format!(
                            "loop_ starting at line {} holds {} values for {} columns",
                            self.loop_start_line, self.loop_value_count, width
                        ),
                    ));
                }
            }
            ParserState::InLoopHeader => {
                for header in &self.loop_headers {
                    self.table.insert(header.clone(), Vec::new());
                }
            }
            ParserState::Base => {}
        }

        self.state = ParserState::Base;
        self.loop_headers.clear();
        self.loop_value_count = 0;
        Ok(())
    }

    fn ensure_no_pending_key(&mut self) -> Result<(), Error> {
        match self.pending_key.take() {
            Some((key, line_num)) => Err(Error::parse(
                FORMAT,
                None,
                line_num,
                format!("data item '{key}' has no value"),
            )),
            None => Ok(()),
        }
    }

    fn finish(mut self) -> Result<FieldTable, Error> {
        self.close_loop()?;
        self.ensure_no_pending_key()?;
        Ok(self.table)
    }
}
