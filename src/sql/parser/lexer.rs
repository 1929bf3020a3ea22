//! SQL Lexer - Tokenizes SQL input text into a stream of tokens

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Result, Error};

/// Represents a single lexical token in the SQL input
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// SQL reserved keyword
    Keyword(Keyword),
    /// Identifier such as table name or column name
    Ident(String),
    /// String literal, single or double quoted
    String(String),
    /// Numeric literal (digits, optionally with a fractional part)
    Number(String),
    /// Operators and punctuation
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
    Minus,
    /// Equal sign
    Equal,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(keyword) => Display::fmt(keyword, f),
            Token::Ident(text) | Token::String(text) | Token::Number(text) => f.write_str(text),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Asterisk => f.write_str("*"),
            Token::Minus => f.write_str("-"),
            Token::Equal => f.write_str("="),
        }
    }
}

/// SQL reserved keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Drop,
    Table,
    Int,
    Integer,
    Text,
    Varchar,
    String,
    Select,
    From,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Where,
    And,
    Null,
    Primary,
    Key,
    Unique,
}

/// Spelling of every keyword, in declaration order
const KEYWORDS: &[(&str, Keyword)] = &[
    ("CREATE", Keyword::Create),
    ("DROP", Keyword::Drop),
    ("TABLE", Keyword::Table),
    ("INT", Keyword::Int),
    ("INTEGER", Keyword::Integer),
    ("TEXT", Keyword::Text),
    ("VARCHAR", Keyword::Varchar),
    ("STRING", Keyword::String),
    ("SELECT", Keyword::Select),
    ("FROM", Keyword::From),
    ("INSERT", Keyword::Insert),
    ("INTO", Keyword::Into),
    ("VALUES", Keyword::Values),
    ("UPDATE", Keyword::Update),
    ("SET", Keyword::Set),
    ("DELETE", Keyword::Delete),
    ("WHERE", Keyword::Where),
    ("AND", Keyword::And),
    ("NULL", Keyword::Null),
    ("PRIMARY", Keyword::Primary),
    ("KEY", Keyword::Key),
    ("UNIQUE", Keyword::Unique),
];

impl Keyword {
    /// Case-insensitive keyword lookup
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map_or("", |(spelling, _)| *spelling)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn symbol(c: char) -> Option<Token> {
    Some(match c {
        '*' => Token::Asterisk,
        '(' => Token::OpenParen,
        ')' => Token::CloseParen,
        ',' => Token::Comma,
        ';' => Token::Semicolon,
        '-' => Token::Minus,
        '=' => Token::Equal,
        _ => return None,
    })
}

/// Splits SQL text into tokens. A character that starts no token is an
/// error and is left unconsumed.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.take_while(char::is_whitespace);
        let c = *self.chars.peek()?;
        Some(match c {
            '\'' | '"' => self.quoted(c),
            c if c.is_ascii_digit() => Ok(self.number()),
            c if c.is_alphabetic() => Ok(self.word()),
            c => match symbol(c) {
                Some(token) => {
                    self.chars.next();
                    Ok(token)
                }
                None => Err(Error::Parse(format!("[Lexer] Unexpected character {}", c))),
            },
        })
    }
}

impl<'a> Lexer<'a> {
    pub fn new(sql_text: &'a str) -> Self {
        Self {
            chars: sql_text.chars().peekable(),
        }
    }

    /// Consumes characters while `predicate` holds, returning them
    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.chars.next_if(|c| predicate(*c)) {
            taken.push(c);
        }
        taken
    }

    /// String literal closed by the same `quote` it opened with; no escapes
    fn quoted(&mut self, quote: char) -> Result<Token> {
        self.chars.next();
        let body = self.take_while(|c| c != quote);
        self.chars
            .next()
            .map(|_| Token::String(body))
            .ok_or(Error::Parse("[Lexer] Unexpected end of string".to_string()))
    }

    /// Digits with an optional fractional part; the parser decides validity
    fn number(&mut self) -> Token {
        let mut text = self.take_while(|c| c.is_ascii_digit());
        if self.chars.next_if_eq(&'.').is_some() {
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        Token::Number(text)
    }

    /// Keyword if the word is reserved, otherwise a lowercased identifier
    fn word(&mut self) -> Token {
        let text = self.take_while(|c| c.is_alphanumeric() || c == '_');
        match Keyword::lookup(&text) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Ident(text.to_lowercase()),
        }
    }
}
