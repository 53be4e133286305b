//! Statement batching reader.
//!
//! Reads a statement stream and groups each delete with the insert(s) that
//! follow it, so a consumer never applies a delete on its own while the
//! replacement values are still in flight.

use crate::error::{CodecError, CodecResult};
use crate::statement::{Batch, Statement, StatementKind, STATEMENT_DELIMITER};
use std::io::BufRead;
use tracing::info;

/// How statements are grouped into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Deletes are held until their inserts arrive.
    #[default]
    Grouped,
    /// Every statement is its own batch, in stream order.
    ByStatement,
}

/// Configuration for [`StatementReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Grouping mode.
    pub grouping: Grouping,
    /// Emit a progress log every this many inserts (0 disables).
    pub progress_every: u64,
}

impl ReaderConfig {
    /// Creates the default grouped configuration.
    pub fn new() -> Self {
        Self {
            grouping: Grouping::Grouped,
            progress_every: 1000,
        }
    }

    /// Sets the grouping mode.
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the progress interval.
    pub fn with_progress_every(mut self, every: u64) -> Self {
        self.progress_every = every;
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Appending physical lines to the current statement.
    Accumulate,
    /// Input exhausted; flush whatever is held.
    Draining,
    /// Finished or failed; yields nothing more.
    Done,
}

/// Iterator of [`Batch`]es over a UTF-8 statement stream.
pub struct StatementReader<R> {
    input: R,
    config: ReaderConfig,
    state: ReadState,
    line: u64,
    statement_start: u64,
    current: String,
    held: Vec<Statement>,
    insert_count: u64,
}

impl<R: BufRead> StatementReader<R> {
    /// Creates a reader with the default configuration.
    pub fn new(input: R) -> Self {
        Self::with_config(input, ReaderConfig::default())
    }

    /// Creates a reader with the given configuration.
    pub fn with_config(input: R, config: ReaderConfig) -> Self {
        Self {
            input,
            config,
            state: ReadState::Accumulate,
            line: 0,
            statement_start: 1,
            current: String::new(),
            held: Vec::new(),
            insert_count: 0,
        }
    }

    /// Number of insert statements read so far.
    pub fn insert_count(&self) -> u64 {
        self.insert_count
    }

    /// Reads physical lines until a full statement is available.
    fn next_statement(&mut self) -> CodecResult<Option<Statement>> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = self.input.read_until(b'\n', &mut raw)?;
            if read == 0 {
                if self.current.trim().is_empty() {
                    return Ok(None);
                }
                return Err(CodecError::Truncated {
                    line: self.statement_start,
                });
            }
            self.line += 1;

            let text = std::str::from_utf8(&raw)
                .map_err(|_| CodecError::InvalidEncoding { line: self.line })?;
            if self.current.is_empty() {
                if text.trim().is_empty() {
                    continue;
                }
                self.statement_start = self.line;
            }
            // CRLF files are read as LF.
            match text.strip_suffix("\r\n") {
                Some(line) => {
                    self.current.push_str(line);
                    self.current.push('\n');
                }
                None => self.current.push_str(text),
            }

            if self.current.ends_with(STATEMENT_DELIMITER) {
                return self.classify().map(Some);
            }
        }
    }

    fn classify(&mut self) -> CodecResult<Statement> {
        let text = std::mem::take(&mut self.current);
        let kind = StatementKind::classify(&text).ok_or_else(|| CodecError::UnknownStatement {
            line: self.statement_start,
            snippet: text.trim().chars().take(40).collect(),
        })?;

        if kind == StatementKind::Insert {
            self.insert_count += 1;
            if self.config.progress_every > 0 && self.insert_count % self.config.progress_every == 0
            {
                info!(inserts = self.insert_count, "read insert statements");
            }
        }
        Ok(Statement::new(kind, text))
    }

    /// Adds a statement to the held group, returning a batch when one closes.
    fn group(&mut self, statement: Statement) -> Option<Batch> {
        if self.config.grouping == Grouping::ByStatement {
            return Batch::new(vec![statement]);
        }

        let held_insert = self.held.iter().any(|s| !s.is_delete());
        match statement.kind() {
            StatementKind::Delete if held_insert => {
                let batch = Batch::new(std::mem::take(&mut self.held));
                self.held.push(statement);
                batch
            }
            StatementKind::Delete => {
                self.held.push(statement);
                None
            }
            StatementKind::Insert if self.held.is_empty() => Batch::new(vec![statement]),
            StatementKind::Insert => {
                self.held.push(statement);
                None
            }
        }
    }

    fn drain(&mut self) -> CodecResult<Option<Batch>> {
        if self.held.is_empty() {
            return Ok(None);
        }
        if self.held.iter().all(Statement::is_delete) {
            return Err(CodecError::UnpairedDelete {
                count: self.held.len(),
            });
        }
        Ok(Batch::new(std::mem::take(&mut self.held)))
    }
}

impl<R: BufRead> Iterator for StatementReader<R> {
    type Item = CodecResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                ReadState::Done => return None,
                ReadState::Draining => {
                    self.state = ReadState::Done;
                    return self.drain().transpose();
                }
                ReadState::Accumulate => match self.next_statement() {
                    Ok(Some(statement)) => {
                        if let Some(batch) = self.group(statement) {
                            return Some(Ok(batch));
                        }
                    }
                    Ok(None) => self.state = ReadState::Draining,
                    Err(err) => {
                        self.state = ReadState::Done;
                        return Some(Err(err));
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DELETE_A: &str = "DELETE WHERE { GRAPH <http://g> { <http://a> <http://p> ?o . } };\n";
    const INSERT_A: &str = "INSERT DATA { GRAPH <http://g> { <http://a> <http://p> \"1\" . } };\n";
    const DELETE_B: &str = "DELETE WHERE { GRAPH <http://g> { <http://b> <http://p> ?o . } };\n";
    const INSERT_B: &str = "INSERT DATA { GRAPH <http://g> {\n<http://b> <http://p> \"x;\" .\n<http://b> <http://p> \"y\" .\n} };\n";

    fn read(text: &str, grouping: Grouping) -> Vec<CodecResult<Batch>> {
        let config = ReaderConfig::new().with_grouping(grouping);
        StatementReader::with_config(Cursor::new(text.as_bytes().to_vec()), config).collect()
    }

    fn kinds(batch: &Batch) -> Vec<StatementKind> {
        batch.statements().iter().map(Statement::kind).collect()
    }

    #[test]
    fn groups_each_delete_with_its_inserts() {
        let text = [DELETE_A, INSERT_A, DELETE_B, INSERT_B].concat();
        let batches: Vec<Batch> = read(&text, Grouping::Grouped)
            .into_iter()
            .collect::<CodecResult<_>>()
            .unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].text(), [DELETE_A, INSERT_A].concat());
        assert_eq!(batches[1].text(), [DELETE_B, INSERT_B].concat());
    }

    #[test]
    fn consecutive_inserts_join_the_open_batch() {
        let text = [DELETE_A, INSERT_A, INSERT_B, DELETE_B, INSERT_B].concat();
        let batches: Vec<Batch> = read(&text, Grouping::Grouped)
            .into_iter()
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(
            kinds(&batches[0]),
            vec![StatementKind::Delete, StatementKind::Insert, StatementKind::Insert]
        );
    }

    #[test]
    fn leading_insert_is_its_own_batch() {
        let text = [INSERT_A, INSERT_B, DELETE_B, INSERT_B].concat();
        let batches: Vec<Batch> = read(&text, Grouping::Grouped)
            .into_iter()
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(kinds(&batches[0]), vec![StatementKind::Insert]);
        assert_eq!(kinds(&batches[1]), vec![StatementKind::Insert]);
    }

    #[test]
    fn clear_only_deletes_ride_with_the_next_pair() {
        let text = [DELETE_A, DELETE_B, INSERT_B].concat();
        let batches: Vec<Batch> = read(&text, Grouping::Grouped)
            .into_iter()
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].delete_count(), 2);
    }

    #[test]
    fn trailing_delete_is_never_emitted_alone() {
        let text = [DELETE_A, INSERT_A, DELETE_B].concat();
        let results = read(&text, Grouping::Grouped);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(CodecError::UnpairedDelete { count: 1 }));
    }

    #[test]
    fn by_statement_mode_emits_immediately() {
        let text = [DELETE_A, INSERT_A, DELETE_B, INSERT_B].concat();
        let batches = read(&text, Grouping::ByStatement);
        assert_eq!(batches.len(), 4);
        assert!(batches.iter().all(|b| b.as_ref().unwrap().len() == 1));
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut bytes = DELETE_A.as_bytes().to_vec();
        bytes.extend_from_slice(b"INSERT DATA { \xff\xfe };\n");
        let config = ReaderConfig::new();
        let results: Vec<_> = StatementReader::with_config(Cursor::new(bytes), config).collect();
        assert_eq!(results, vec![Err(CodecError::InvalidEncoding { line: 2 })]);
    }

    #[test]
    fn crlf_lines_read_like_lf() {
        let text = [DELETE_A, INSERT_A, DELETE_B, INSERT_B].concat();
        let crlf = text.replace('\n', "\r\n");
        let lf_batches: Vec<_> = read(&text, Grouping::Grouped)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let crlf_batches: Vec<_> = read(&crlf, Grouping::Grouped)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(crlf_batches, lf_batches);
        assert_eq!(crlf_batches.len(), 2);
    }

    #[test]
    fn truncated_statement_is_reported() {
        let text = [INSERT_A, "INSERT DATA { GRAPH <http://g> {\n"].concat();
        let results = read(&text, Grouping::Grouped);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(CodecError::Truncated { line: 2 }));
    }

    #[test]
    fn unknown_verb_is_rejected() {
        let results = read("CLEAR GRAPH <http://g>;\n", Grouping::Grouped);
        assert!(matches!(
            results[0],
            Err(CodecError::UnknownStatement { line: 1, .. })
        ));
    }

    #[test]
    fn counts_inserts() {
        let text = [DELETE_A, INSERT_A, INSERT_B].concat();
        let mut reader = StatementReader::new(Cursor::new(text.into_bytes()));
        while reader.next().is_some() {}
        assert_eq!(reader.insert_count(), 2);
    }
}
