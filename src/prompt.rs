use crossterm::style::{style, Stylize};
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Input ended before a valid answer was given
    #[error("input closed before a valid answer was given")]
    Closed,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Verdict of a prompt's validation callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Invalid,
}

impl<T> From<Option<T>> for Validation<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Validation::Valid(v),
            None => Validation::Invalid,
        }
    }
}

/// Clean up a typed answer: trim it, turn inner spaces into `_`, drop quotes
pub fn normalize(line: &str) -> String {
    line.trim().replace(' ', "_").replace('"', "")
}

/// `1) first`, `2) second`, ... one per line
pub fn numbered<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}) {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line-based question/answer loop over any reader and writer
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of regular output
    pub fn say(&mut self, text: impl Display) -> Result<(), PromptError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Print a heading followed by a numbered list
    pub fn show_list<T: Display>(&mut self, heading: &str, items: &[T]) -> Result<(), PromptError> {
        writeln!(self.output, "{}", style(heading).bold())?;
        writeln!(self.output, "{}", numbered(items))?;
        Ok(())
    }

    fn read_line(&mut self, text: &str) -> Result<String, PromptError> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line)
    }

    fn reject(&mut self) -> Result<(), PromptError> {
        writeln!(self.output, "{}", style("Invalid input!").red())?;
        Ok(())
    }

    /// Ask until `validate` accepts the normalized answer.
    ///
    /// There is no retry limit; only the end of input stops the loop.
    pub fn ask<T>(
        &mut self,
        text: &str,
        mut validate: impl FnMut(&str) -> Validation<T>,
    ) -> Result<T, PromptError> {
        loop {
            let answer = normalize(&self.read_line(text)?);
            if let Validation::Valid(value) = validate(&answer) {
                return Ok(value);
            }
            self.reject()?;
        }
    }

    /// Number `items`, show them, and ask until a position in `1..=len` is typed
    pub fn select<'a, T: Display>(
        &mut self,
        heading: &str,
        question: &str,
        items: &'a [T],
    ) -> Result<&'a T, PromptError> {
        self.show_list(heading, items)?;
        loop {
            let answer = self.read_line(question)?;
            let picked = answer
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| items.get(i));

            match picked {
                Some(item) => return Ok(item),
                None => self.reject()?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: Prompt<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  my host \n"), "my_host");
        assert_eq!(normalize("\"quoted name\""), "quoted_name");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn test_numbered() {
        assert_eq!(numbered(&["a", "b"]), "1) a\n2) b");
        assert_eq!(numbered::<&str>(&[]), "");
    }

    #[test]
    fn test_ask_retries_until_valid() {
        let mut p = prompt("\n\nweb app\n");
        let answer = p
            .ask("Alias: ", |s| Validation::from((!s.is_empty()).then(|| s.to_string())))
            .unwrap();
        assert_eq!(answer, "web_app");

        let out = output(p);
        assert_eq!(out.matches("Alias: ").count(), 3);
        assert_eq!(out.matches("Invalid input!").count(), 2);
    }

    #[test]
    fn test_ask_can_transform() {
        let mut p = prompt("abc\n42\n");
        let n = p.ask("Port: ", |s| Validation::from(s.parse::<u16>().ok())).unwrap();
        assert_eq!(n, 42);
    }

    #[test]
    fn test_ask_end_of_input() {
        let mut p = prompt("bad\n");
        let err = p.ask("Q: ", |_| Validation::<String>::Invalid).unwrap_err();
        assert!(matches!(err, PromptError::Closed));
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let items = vec!["webapp".to_string(), "webapp-8080".to_string()];
        let mut p = prompt("0\n3\nx\n 2 \n");
        let picked = p.select("Matches:", "Pick: ", &items).unwrap();
        assert_eq!(picked, "webapp-8080");

        let out = output(p);
        assert!(out.contains("1) webapp\n2) webapp-8080"));
        assert_eq!(out.matches("Invalid input!").count(), 3);
    }
}
