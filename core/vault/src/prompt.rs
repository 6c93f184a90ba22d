//! Sources of placeholder replacements.
//!
//! The interactive source talks to the operator over any `BufRead`/`Write`
//! pair (stdin/stdout in the CLI, byte buffers in tests). The answer map is
//! the non-interactive alternative keyed by document path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use jsonvault_common::{Error, JsonPath, Result};

/// Supplies the text that replaces a placeholder.
pub trait ReplacementSource {
    /// Get the replacement for the placeholder at `path`.
    ///
    /// May block until the value is available.
    fn replacement(&mut self, path: &JsonPath) -> Result<String>;
}

/// The person running a session.
pub trait Operator: ReplacementSource {
    /// Display a block of text.
    fn show(&mut self, text: &str) -> Result<()>;

    /// Display `prompt` and block until the operator acknowledges it.
    fn acknowledge(&mut self, prompt: &str) -> Result<()>;
}

/// Line-oriented console operator.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Create a prompt over an input and output stream.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Get the output stream.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Consume the prompt, returning its streams.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Read one line without its terminator; `None` at end of input.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }

        if bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl<R: BufRead, W: Write> ReplacementSource for ConsolePrompt<R, W> {
    fn replacement(&mut self, path: &JsonPath) -> Result<String> {
        write!(self.output, "Enter replacement for '{}': ", path)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }
}

impl<R: BufRead, W: Write> Operator for ConsolePrompt<R, W> {
    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    fn acknowledge(&mut self, prompt: &str) -> Result<()> {
        writeln!(self.output, "{}", prompt)?;
        self.output.flush()?;
        self.read_line()?;
        Ok(())
    }
}

/// Replacements supplied up front, keyed by path (e.g. `db.password`).
#[derive(Default)]
pub struct AnswerMap {
    answers: BTreeMap<String, String>,
    used: BTreeSet<String>,
}

impl AnswerMap {
    /// Create from path/answer pairs.
    pub fn new<I, K, V>(answers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            answers: answers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            used: BTreeSet::new(),
        }
    }

    /// Parse a JSON object whose values are all strings.
    ///
    /// # Errors
    /// - `Parse` if the text is not such an object
    pub fn from_json(text: &str) -> Result<Self> {
        let answers: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| Error::Parse(format!("answers: {}", e)))?;
        Ok(Self::new(answers))
    }

    /// Load answers from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Number of answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Paths that were supplied but never asked for.
    pub fn unused(&self) -> Vec<&str> {
        self.answers
            .keys()
            .filter(|k| !self.used.contains(*k))
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Debug for AnswerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerMap")
            .field("paths", &self.answers.keys().collect::<Vec<_>>())
            .field("used", &self.used)
            .finish()
    }
}

impl ReplacementSource for AnswerMap {
    fn replacement(&mut self, path: &JsonPath) -> Result<String> {
        let answer = self
            .answers
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| Error::MissingAnswer(path.to_string()))?;
        self.used.insert(path.to_string());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> ConsolePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn written(prompt: ConsolePrompt<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompt.into_inner().1).unwrap()
    }

    #[test]
    fn test_console_replacement() {
        let mut prompt = console("alice\r\nprod\n");
        let path = JsonPath::root().key("name");

        assert_eq!(prompt.replacement(&path).unwrap(), "alice");
        assert_eq!(prompt.replacement(&JsonPath::root().index(0)).unwrap(), "prod");
        assert_eq!(
            written(prompt),
            "Enter replacement for 'name': Enter replacement for '[0]': "
        );
    }

    #[test]
    fn test_console_end_of_input_is_empty() {
        let mut prompt = console("last");
        let path = JsonPath::root().key("x");

        assert_eq!(prompt.replacement(&path).unwrap(), "last");
        assert_eq!(prompt.replacement(&path).unwrap(), "");
    }

    #[test]
    fn test_console_keeps_inner_whitespace() {
        let mut prompt = console("  spaced out  \n");
        assert_eq!(
            prompt.replacement(&JsonPath::root().key("k")).unwrap(),
            "  spaced out  "
        );
    }

    #[test]
    fn test_console_invalid_utf8_is_replaced() {
        let mut prompt = ConsolePrompt::new(Cursor::new(b"caf\xe9\r\nok\n".to_vec()), Vec::new());
        let path = JsonPath::root().key("k");

        assert_eq!(prompt.replacement(&path).unwrap(), "caf\u{fffd}");
        assert_eq!(prompt.replacement(&path).unwrap(), "ok");
    }

    #[test]
    fn test_console_acknowledge_consumes_one_line() {
        let mut prompt = console("anything\nnext\n");

        prompt.acknowledge("Press Enter").unwrap();
        assert_eq!(prompt.replacement(&JsonPath::root().key("k")).unwrap(), "next");
        assert!(written(prompt).starts_with("Press Enter\n"));
    }

    #[test]
    fn test_console_acknowledge_at_end_of_input() {
        let mut prompt = console("");
        assert!(prompt.acknowledge("Press Enter").is_ok());
    }

    #[test]
    fn test_answer_map_lookup() {
        let mut answers = AnswerMap::new([("db.password", "s3cret"), ("extra", "x")]);

        let path = JsonPath::root().key("db").key("password");
        assert_eq!(answers.replacement(&path).unwrap(), "s3cret");
        assert_eq!(answers.unused(), vec!["extra"]);
    }

    #[test]
    fn test_answer_map_missing() {
        let mut answers = AnswerMap::default();
        let err = answers.replacement(&JsonPath::root().index(3)).unwrap_err();
        assert!(matches!(err, Error::MissingAnswer(p) if p == "[3]"));
    }

    #[test]
    fn test_answer_map_debug_hides_values() {
        let answers = AnswerMap::new([("db.password", "s3cret")]);
        let debug = format!("{:?}", answers);

        assert!(debug.contains("db.password"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_answer_map_from_json() {
        let answers = AnswerMap::from_json(r#"{"name": "alice", "tags[0]": "prod"}"#).unwrap();
        assert_eq!(answers.len(), 2);

        assert!(matches!(
            AnswerMap::from_json(r#"{"port": 8080}"#),
            Err(Error::Parse(_))
        ));
        assert!(AnswerMap::from_json("[]").is_err());
    }
}
