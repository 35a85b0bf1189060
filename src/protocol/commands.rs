//! Module `commands`
//!
//! Splits raw control lines into a verb and its arguments.

/// Characters separating tokens on a control line.
pub const COMMAND_DELIMITERS: &[char] = &[' ', '\t', '\r', '\n'];

/// A parsed control command, consumed as soon as it is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Upper-cased verb, e.g. `RETR`
    pub verb: String,
    pub args: Vec<String>,
}

impl Command {
    /// Parses one control line. Returns `None` when the line holds no tokens.
    pub fn parse(line: &str) -> Option<Command> {
        let mut tokens = tokenize(line, COMMAND_DELIMITERS).into_iter();
        let verb = tokens.next()?.to_ascii_uppercase();
        let args = tokens.map(str::to_string).collect();
        Some(Command { verb, args })
    }

    /// First argument, if any.
    pub fn arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Splits `line` on runs of any of `delimiters`, never yielding empty tokens.
pub fn tokenize<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    line.split(|c: char| delimiters.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_collapses_delimiters() {
        assert_eq!(
            tokenize("  RETR   file.txt \r\n", COMMAND_DELIMITERS),
            vec!["RETR", "file.txt"]
        );
        assert_eq!(tokenize("a,,b,", &[',']), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("", COMMAND_DELIMITERS).is_empty());
        assert!(tokenize(" \r\n", COMMAND_DELIMITERS).is_empty());
    }

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(
            Command::parse("QUIT\r\n"),
            Some(Command { verb: "QUIT".into(), args: vec![] })
        );
        assert_eq!(
            Command::parse("PORT 127,0,0,1,4,1"),
            Some(Command {
                verb: "PORT".into(),
                args: vec!["127,0,0,1,4,1".into()],
            })
        );
    }

    #[test]
    fn test_parse_uppercases_verb_only() {
        let command = Command::parse("retr MixedCase.bin").unwrap();
        assert_eq!(command.verb, "RETR");
        assert_eq!(command.arg(), Some("MixedCase.bin"));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("\t \r\n"), None);
    }
}
