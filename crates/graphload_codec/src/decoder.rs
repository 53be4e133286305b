//! Statement text decoder.
//!
//! Parses exactly the subset written by [`crate::StatementEncoder`]. It is
//! used to check that generated text reads back to the same triples and by
//! test stores that apply statements in memory.

use crate::error::{CodecError, CodecResult};
use crate::statement::ParsedStatement;
use crate::term::{Term, Triple, Uri};

/// Parse one statement.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if the text is not a delete or insert
/// statement in the encoder's format.
pub fn parse_statement(text: &str) -> CodecResult<ParsedStatement> {
    let mut decoder = StatementDecoder::new(text);
    let statement = decoder.statement()?;
    decoder.skip_whitespace();
    if !decoder.is_empty() {
        return Err(decoder.error("trailing text after statement"));
    }
    Ok(statement)
}

/// Reverse [`crate::escape_literal`].
///
/// # Errors
///
/// Returns an error for unknown escapes or invalid code points.
pub fn unescape_literal(escaped: &str) -> CodecResult<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars
            .next()
            .map(|(_, e)| e)
            .ok_or_else(|| CodecError::malformed(offset, "dangling escape"))?;
        match escape {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'u' | 'U' => {
                let width = if escape == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).map(|(_, h)| h).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == width)
                    .and_then(char::from_u32)
                    .ok_or_else(|| CodecError::malformed(offset, "invalid unicode escape"))?;
                out.push(code);
            }
            other => {
                return Err(CodecError::malformed(
                    offset,
                    format!("unknown escape \\{other}"),
                ))
            }
        }
    }
    Ok(out)
}

/// A cursor over statement text.
pub struct StatementDecoder<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> StatementDecoder<'a> {
    /// Create a decoder for the given text.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Check if all text has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Decode the next statement.
    pub fn statement(&mut self) -> CodecResult<ParsedStatement> {
        self.skip_whitespace();
        if self.eat("DELETE") {
            self.expect("WHERE")?;
            self.expect("{")?;
            self.expect("GRAPH")?;
            let graph = self.uri()?;
            self.expect("{")?;
            let subject = self.uri()?;
            let predicate = self.uri()?;
            self.expect("?o")?;
            self.expect(".")?;
            self.expect("}")?;
            self.expect("}")?;
            self.expect(";")?;
            Ok(ParsedStatement::Delete {
                graph,
                subject,
                predicate,
            })
        } else if self.eat("INSERT") {
            self.expect("DATA")?;
            self.expect("{")?;
            self.expect("GRAPH")?;
            let graph = self.uri()?;
            self.expect("{")?;
            let mut triples = Vec::new();
            loop {
                self.skip_whitespace();
                if self.eat("}") {
                    break;
                }
                let subject = self.uri()?;
                let predicate = self.uri()?;
                let object = self.term()?;
                self.expect(".")?;
                triples.push(Triple::new(subject, predicate, object, graph.clone()));
            }
            self.expect("}")?;
            self.expect(";")?;
            Ok(ParsedStatement::Insert { triples })
        } else {
            Err(self.error("expected DELETE or INSERT"))
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> CodecResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{token}`")))
        }
    }

    fn uri(&mut self) -> CodecResult<Uri> {
        self.expect("<")?;
        let rest = self.rest();
        let end = rest
            .find('>')
            .ok_or_else(|| self.error("unterminated URI"))?;
        let uri = Uri::parse(&rest[..end]).map_err(|e| self.error(e.to_string()))?;
        self.pos += end + 1;
        Ok(uri)
    }

    fn term(&mut self) -> CodecResult<Term> {
        self.skip_whitespace();
        if self.rest().starts_with('<') {
            return self.uri().map(Term::Uri);
        }
        self.expect("\"")?;

        let start = self.pos;
        let mut escaped = false;
        let mut end = None;
        for (i, c) in self.rest().char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = Some(i);
                    break;
                }
                '\n' | '\r' => return Err(self.error("raw line break inside literal")),
                _ => {}
            }
        }
        let end = end.ok_or_else(|| self.error("unterminated literal"))?;
        let value = unescape_literal(&self.text[start..start + end])
            .map_err(|e| self.error(e.to_string()))?;
        self.pos = start + end + 1;

        let datatype = if self.rest().starts_with("^^") {
            self.pos += 2;
            Some(self.uri()?)
        } else {
            None
        };
        Ok(Term::Literal { value, datatype })
    }

    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::malformed(self.pos, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{escape_literal, StatementEncoder};
    use proptest::prelude::*;

    #[test]
    fn parse_delete() {
        let parsed = parse_statement(
            "DELETE WHERE { GRAPH <http://g> { <http://s> <http://p> ?o . } };\n",
        )
        .unwrap();
        assert_eq!(
            parsed,
            ParsedStatement::Delete {
                graph: Uri::new("http://g"),
                subject: Uri::new("http://s"),
                predicate: Uri::new("http://p"),
            }
        );
    }

    #[test]
    fn parse_multiline_insert() {
        let text = "INSERT DATA { GRAPH <http://g> {\n\
                    <http://s> <http://p> \"x\" .\n\
                    <http://s> <http://p> \"7\"^^<http://dt> .\n\
                    } };\n";
        let ParsedStatement::Insert { triples } = parse_statement(text).unwrap() else {
            panic!("expected insert");
        };
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].object, Term::literal("x"));
        assert_eq!(triples[1].object, Term::typed("7", Uri::new("http://dt")));
        assert_eq!(triples[1].graph, Uri::new("http://g"));
    }

    #[test]
    fn reject_other_verbs_and_trailing_text() {
        assert!(parse_statement("CLEAR ALL;\n").is_err());
        assert!(parse_statement(
            "DELETE WHERE { GRAPH <http://g> { <http://s> <http://p> ?o . } }; extra"
        )
        .is_err());
    }

    #[test]
    fn unknown_escape_is_an_error() {
        assert!(unescape_literal("bad \\q escape").is_err());
        assert_eq!(unescape_literal("\\u00e9t\\U0001F600").unwrap(), "ét😀");
    }

    proptest! {
        #[test]
        fn literal_escaping_is_lossless(value in "\\PC*|[;\"\\\\\n\r\t]{0,8}") {
            prop_assert_eq!(unescape_literal(&escape_literal(&value)).unwrap(), value);
        }

        #[test]
        fn encoded_insert_reads_back(value in any::<String>()) {
            let mut encoder = StatementEncoder::new();
            let statement = encoder
                .insert(
                    &Uri::new("http://g"),
                    &Uri::new("http://s"),
                    &Uri::new("http://p"),
                    &[Term::literal(value.clone())],
                )
                .unwrap();
            let ParsedStatement::Insert { triples } = parse_statement(statement.text()).unwrap() else {
                panic!("expected insert");
            };
            prop_assert_eq!(triples[0].object.as_literal(), Some(value.as_str()));
        }
    }
}
