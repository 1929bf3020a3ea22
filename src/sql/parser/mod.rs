use std::collections::BTreeMap;
use std::iter::Peekable;

use crate::error::{Result, Error};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use super::schema::Column;
use super::types::{Conditions, DataType, Value};

pub mod ast;
mod lexer;

/// SQL Parser - Converts tokens into an operation descriptor
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input
    pub fn new(input: &'a str) -> Self {
        Parser { lexer: Lexer::new(input).peekable() }
    }

    /// Parses the input SQL statement
    ///
    /// The trailing semicolon is optional, but nothing may follow it.
    pub fn parse(&mut self) -> Result<ast::Statement> {
        let stmt = self.parse_statement()?;
        self.next_if_token(Token::Semicolon);
        if let Some(token) = self.peek()? {
            return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
        }
        Ok(stmt)
    }

    /// Parses a statement based on the first token
    fn parse_statement(&mut self) -> Result<ast::Statement> {
        match self.peek()? {
            Some(Token::Keyword(Keyword::Create)) => self.parse_ddl(),
            Some(Token::Keyword(Keyword::Drop)) => self.parse_ddl(),
            Some(Token::Keyword(Keyword::Select)) => self.parse_select(),
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert(),
            Some(Token::Keyword(Keyword::Update)) => self.parse_update(),
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete(),
            Some(t) => Err(Error::Parse(format!("[Parser] Unexpected token {}", t))),
            None => Err(Error::Parse("[Parser] Unexpected end of input".to_string())),
        }
    }

    /// Parses DDL statements (CREATE TABLE, DROP TABLE)
    fn parse_ddl(&mut self) -> Result<ast::Statement> {
        match self.next()? {
            Token::Keyword(Keyword::Create) => match self.next()? {
                Token::Keyword(Keyword::Table) => self.parse_ddl_create_table(),
                token => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
            },
            Token::Keyword(Keyword::Drop) => match self.next()? {
                Token::Keyword(Keyword::Table) => Ok(ast::Statement::DropTable { name: self.next_ident()? }),
                token => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
            },
            token => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
        }
    }

    /// Parses CREATE TABLE statement
    fn parse_ddl_create_table(&mut self) -> Result<ast::Statement> {
        let table_name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_ddl_column()?);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        Ok(ast::Statement::CreateTable { name: table_name, columns })
    }

    /// Parses column definition in CREATE TABLE
    fn parse_ddl_column(&mut self) -> Result<Column> {
        let name = self.next_ident()?;
        let datatype = match self.next()? {
            Token::Keyword(Keyword::Int) | Token::Keyword(Keyword::Integer) => DataType::Int,
            Token::Keyword(Keyword::Text) | Token::Keyword(Keyword::Varchar) | Token::Keyword(Keyword::String) => DataType::Text,
            token => return Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
        };

        let (mut primary_key, mut unique) = (false, false);
        while let Some(Token::Keyword(keyword)) = self.next_if_keyword() {
            match keyword {
                Keyword::Primary => {
                    self.next_expect(Token::Keyword(Keyword::Key))?;
                    primary_key = true;
                }
                Keyword::Unique => unique = true,
                k => return Err(Error::Parse(format!("[Parser] Unexpected keyword {}", k))),
            }
        }

        Ok(Column::new(name, datatype, primary_key, unique))
    }

    /// Parses SELECT statement: `SELECT * | col, ... FROM table [WHERE ...]`
    fn parse_select(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Select))?;

        let projection = if self.next_if_token(Token::Asterisk).is_some() {
            None
        } else {
            let mut cols = Vec::new();
            loop {
                cols.push(self.next_ident()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
            Some(cols)
        };
        self.next_expect(Token::Keyword(Keyword::From))?;

        let table_name = self.next_ident()?;
        Ok(ast::Statement::Select {
            table_name,
            projection,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses INSERT statement: `INSERT INTO table VALUES (v, ...)`
    fn parse_insert(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Insert))?;
        self.next_expect(Token::Keyword(Keyword::Into))?;

        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Values))?;
        self.next_expect(Token::OpenParen)?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            match self.next()? {
                Token::CloseParen => break,
                Token::Comma => {}
                token => {
                    return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
                }
            }
        }
        Ok(ast::Statement::Insert { table_name, values })
    }

    /// Parses UPDATE statement: `UPDATE table SET col = v, ... [WHERE ...]`
    fn parse_update(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Update))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let mut assignments = BTreeMap::new();
        loop {
            let (col, value) = self.parse_equality()?;
            // a = 1, a = 2 in one SET list is ambiguous
            if assignments.contains_key(&col) {
                return Err(Error::Parse(format!(
                    "[Parser] Duplicate column {} for update",
                    col
                )));
            }
            assignments.insert(col, value);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        Ok(ast::Statement::Update {
            table_name,
            assignments,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE statement: `DELETE FROM table [WHERE ...]`
    fn parse_delete(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Delete))?;
        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        Ok(ast::Statement::Delete {
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses a literal value
    ///
    /// Decimal numbers have no column type of their own; they are carried as
    /// text so that an INT column rejects them during coercion.
    fn parse_literal(&mut self) -> Result<Value> {
        Ok(match self.next()? {
            Token::Number(n) => {
                if n.chars().all(|c| c.is_ascii_digit()) {
                    Value::Int(n.parse()?)
                } else {
                    Value::Text(n)
                }
            }
            Token::Minus => match self.next()? {
                Token::Number(n) if n.chars().all(|c| c.is_ascii_digit()) => {
                    Value::Int(format!("-{}", n).parse()?)
                }
                Token::Number(n) => Value::Text(format!("-{}", n)),
                t => {
                    return Err(Error::Parse(format!(
                        "[Parser] Expected number after -, got {}",
                        t
                    )))
                }
            },
            Token::String(s) => Value::Text(s),
            Token::Keyword(Keyword::Null) => Value::Null,
            t => {
                return Err(Error::Parse(format!(
                    "[Parser] Unexpected expression token {}",
                    t
                )))
            }
        })
    }

    /// Parses `column = literal`
    fn parse_equality(&mut self) -> Result<(String, Value)> {
        let col = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        Ok((col, self.parse_literal()?))
    }

    /// Parses an optional WHERE clause of ANDed equalities
    fn parse_where_clause(&mut self) -> Result<Option<Conditions>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        let mut conditions = BTreeMap::new();
        loop {
            let (col, value) = self.parse_equality()?;
            if conditions.contains_key(&col) {
                return Err(Error::Parse(format!(
                    "[Parser] Duplicate condition on column {}",
                    col
                )));
            }
            conditions.insert(col, value);
            if self.next_if_token(Token::Keyword(Keyword::And)).is_none() {
                break;
            }
        }
        Ok(Some(conditions))
    }

    /// Peeks at the next token
    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.lexer.next().unwrap_or_else(|| Err(Error::Parse("[Parser] Unexpected end of input".to_string())))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Parse(format!(
                "[Parser] Expected ident, got token {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Parse(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it satisfies the predicate
    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.peek().unwrap_or(None).filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consumes next token if it's a keyword
    fn next_if_keyword(&mut self) -> Option<Token> {
        self.next_if(|t| matches!(t, Token::Keyword(_)))
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}
