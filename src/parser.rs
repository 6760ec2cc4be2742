/*!
Lexer and recursive descent parser for propositional sentences.

Grammar, one sentence per line:

```text
Line            -> LogicalSentence EndOfLine
LogicalSentence -> OrAndOperands [ (=> | <=>) OrAndOperands ]
OrAndOperands   -> AndOperands (OR AndOperands)*
AndOperands     -> Term (AND Term)*
Term            -> ~Term | (LogicalSentence) | Symbol
```

Conditionals bind loosest and do not chain, AND binds tighter than OR, both
are left-associative, and `~` binds tightest.
*/

use std::{
    iter::Peekable,
    path::{Path, PathBuf},
    str::Chars,
};

use crate::prelude::*;
use crate::sentence::{Connective, Sentence};
use crate::symbols::Symbol;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while reading sentence file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Syntax error at line {}: unexpected character '{}'", line, character))]
    UnexpectedCharacter { line: usize, character: char },
    #[snafu(display(
        "Syntax error at line {}: '{}' is not a connective, expected '=>' or '<=>'",
        line,
        text
    ))]
    UnrecognizedConnective { line: usize, text: String },
    #[snafu(display("Syntax error at line {}: expected a symbol, received '{}'", line, token))]
    ExpectedSymbol { line: usize, token: String },
    #[snafu(display("Syntax error at line {}: expected ')', received '{}'", line, token))]
    ExpectedClosingParen { line: usize, token: String },
    #[snafu(display(
        "Syntax error at line {}: expected 'AND' or 'OR', received '{}'",
        line,
        token
    ))]
    ExpectedConnective { line: usize, token: String },
    #[snafu(display(
        "Syntax error at line {}: expected end of sentence, received '{}'",
        line,
        token
    ))]
    ExpectedEndOfLine { line: usize, token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Symbol(Symbol),
    And,
    Or,
    Implies,
    Biconditional,
    Not,
    LeftParen,
    RightParen,
    Newline,
    EndOfInput,
}

impl Token {
    /// Name used by syntax error messages.
    fn name(&self) -> String {
        match self {
            Token::Symbol(symbol) => symbol.to_string(),
            Token::And => "AND".to_owned(),
            Token::Or => "OR".to_owned(),
            Token::Implies => "=>".to_owned(),
            Token::Biconditional => "<=>".to_owned(),
            Token::Not => "~".to_owned(),
            Token::LeftParen => "(".to_owned(),
            Token::RightParen => ")".to_owned(),
            Token::Newline => "new line".to_owned(),
            Token::EndOfInput => "end of input".to_owned(),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            let c = match self.chars.peek().copied() {
                Some(c) => c,
                None => return Ok(Token::EndOfInput),
            };

            match c {
                ' ' | '\t' | '\r' => {
                    self.chars.next();
                }
                '\n' => {
                    // a run of newlines folds into one token
                    while self.chars.peek() == Some(&'\n') {
                        self.chars.next();
                        self.line += 1;
                    }
                    return Ok(Token::Newline);
                }
                '~' => {
                    self.chars.next();
                    return Ok(Token::Not);
                }
                '(' => {
                    self.chars.next();
                    return Ok(Token::LeftParen);
                }
                ')' => {
                    self.chars.next();
                    return Ok(Token::RightParen);
                }
                '=' | '<' | '>' => return self.scan_connective(),
                c if c.is_ascii_alphabetic() => return Ok(self.scan_word()),
                c => {
                    return UnexpectedCharacter {
                        line: self.line,
                        character: c,
                    }
                    .fail()
                }
            }
        }
    }

    fn scan_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            word.push(c.to_ascii_lowercase());
            self.chars.next();
        }

        match word.as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            _ => Token::Symbol(word.parse().expect("scanned words are valid symbol names")),
        }
    }

    /// Consumes a maximal run of `=`, `<` and `>`, which must spell one of
    /// the two conditional connectives.
    fn scan_connective(&mut self) -> Result<Token, Error> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c != '=' && c != '<' && c != '>' {
                break;
            }
            text.push(c);
            self.chars.next();
        }

        match text.as_str() {
            "=>" => Ok(Token::Implies),
            "<=>" => Ok(Token::Biconditional),
            _ => UnrecognizedConnective {
                line: self.line,
                text,
            }
            .fail(),
        }
    }
}

/// Single-lookahead parser over one input text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(text);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Parses the next sentence, or `None` once the input is exhausted.
    /// Blank lines between sentences are skipped.
    pub fn next_sentence(&mut self) -> Result<Option<Sentence>, Error> {
        while self.current == Token::Newline {
            self.advance()?;
        }
        if self.current == Token::EndOfInput {
            return Ok(None);
        }

        let sentence = self.logical_sentence()?;
        self.consume_end_of_line()?;
        Ok(Some(sentence))
    }

    /// Consumes the current token and returns it, pulling the next one in.
    fn advance(&mut self) -> Result<Token, Error> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn logical_sentence(&mut self) -> Result<Sentence, Error> {
        let left = self.or_and_operands()?;

        let op = match self.current {
            Token::Implies => Connective::Implies,
            Token::Biconditional => Connective::Biconditional,
            _ => return Ok(left),
        };
        self.advance()?;
        let right = self.or_and_operands()?;

        // a second conditional on the same line trips the end-of-line check
        Ok(Sentence::binary(left, op, right))
    }

    fn or_and_operands(&mut self) -> Result<Sentence, Error> {
        let mut sentence = self.and_operands()?;

        while self.current == Token::Or {
            self.advance()?;
            let right = self.and_operands()?;
            sentence = Sentence::binary(sentence, Connective::Or, right);
        }

        Ok(sentence)
    }

    fn and_operands(&mut self) -> Result<Sentence, Error> {
        let mut sentence = self.term()?;

        while self.current == Token::And {
            self.advance()?;
            let right = self.term()?;
            sentence = Sentence::binary(sentence, Connective::And, right);
        }

        ensure!(
            self.current == Token::Or || self.at_sub_sentence_end(),
            ExpectedConnective {
                line: self.lexer.line,
                token: self.current.name(),
            }
        );

        Ok(sentence)
    }

    fn term(&mut self) -> Result<Sentence, Error> {
        match self.current {
            Token::Not => {
                self.advance()?;
                let inner = self.term()?;
                Ok(inner.negate())
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.logical_sentence()?;
                ensure!(
                    self.current == Token::RightParen,
                    ExpectedClosingParen {
                        line: self.lexer.line,
                        token: self.current.name(),
                    }
                );
                self.advance()?;
                Ok(inner)
            }
            Token::Symbol(_) => match self.advance()? {
                Token::Symbol(symbol) => Ok(Sentence::symbol(symbol)),
                _ => unreachable!(),
            },
            _ => ExpectedSymbol {
                line: self.lexer.line,
                token: self.current.name(),
            }
            .fail(),
        }
    }

    fn at_sub_sentence_end(&self) -> bool {
        matches!(
            self.current,
            Token::Newline
                | Token::EndOfInput
                | Token::Implies
                | Token::Biconditional
                | Token::RightParen
        )
    }

    fn consume_end_of_line(&mut self) -> Result<(), Error> {
        match self.current {
            Token::EndOfInput => Ok(()),
            Token::Newline => {
                while self.current == Token::Newline {
                    self.advance()?;
                }
                Ok(())
            }
            _ => ExpectedEndOfLine {
                line: self.lexer.line,
                token: self.current.name(),
            }
            .fail(),
        }
    }
}

/// Parses the first sentence of `text`, or `None` when it holds none.
pub fn parse_sentence(text: &str) -> Result<Option<Sentence>, Error> {
    Parser::new(text)?.next_sentence()
}

/// Parses every newline-separated sentence of `text`.
pub fn parse_all(text: &str) -> Result<Vec<Sentence>, Error> {
    let mut parser = Parser::new(text)?;
    let mut sentences = Vec::new();
    while let Some(sentence) = parser.next_sentence()? {
        sentences.push(sentence);
    }
    Ok(sentences)
}

/// Parses a knowledge base file, one sentence per line.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Sentence>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).context(IoError {
        path: path.to_owned(),
    })?;
    parse_all(&text)
}
