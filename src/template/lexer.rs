use crate::error::CompileError;

use super::ops::{self, OpKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Op(OpKind),
    /// Anything between operators, trimmed: identifiers, `$`, `$name`, literals
    Word(String),
    At,     // @
    LParen, // (
    RParen, // )
    Comma,  // ,
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    word: String,
    /// Open parentheses; `,` only separates arguments inside a group.
    depth: usize,
    pub tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            word: String::new(),
            depth: 0,
            tokens: Vec::new(),
        }
    }

    /// Split the input into tokens. Characters that start no operator or
    /// punctuation (including a stray `*`, `[` or `]`) are word text.
    pub fn tokenize(&mut self) -> Result<&[Token], CompileError> {
        while self.pos < self.input.len() {
            if let Some((kind, len)) = self.match_operator() {
                self.flush_word();
                self.tokens.push(Token::Op(kind));
                self.pos += len;
                continue;
            }

            let ch = self.input[self.pos];
            let punct = match ch {
                '(' => {
                    self.depth += 1;
                    Some(Token::LParen)
                }
                ')' => {
                    if self.depth == 0 {
                        return Err(CompileError::Tokenize {
                            position: self.pos,
                            ch,
                        });
                    }
                    self.depth -= 1;
                    Some(Token::RParen)
                }
                ',' if self.depth > 0 => Some(Token::Comma),
                '@' if self.word.trim().is_empty() => Some(Token::At),
                _ => None,
            };
            match punct {
                Some(tok) => {
                    self.flush_word();
                    self.tokens.push(tok);
                }
                None => self.word.push(ch),
            }
            self.pos += 1;
        }
        self.flush_word();
        Ok(&self.tokens)
    }

    /// Longest operator spelling starting at the current position.
    fn match_operator(&self) -> Option<(OpKind, usize)> {
        let rest = &self.input[self.pos..];
        ops::by_spelling_length().iter().find_map(|info| {
            let len = info.spelling.chars().count();
            let matches = rest.len() >= len && info.spelling.chars().zip(rest).all(|(a, b)| a == *b);
            matches.then_some((info.kind, len))
        })
    }

    fn flush_word(&mut self) {
        let word = self.word.trim();
        if !word.is_empty() {
            self.tokens.push(Token::Word(word.to_string()));
        }
        self.word.clear();
    }
}
