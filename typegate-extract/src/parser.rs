// typegate-extract/src/parser.rs
// ============================================================================
// Module: Declaration Parser
// Description: Recursive-descent parser for the declaration grammar.
// Purpose: Build declaration ASTs and apply marker scoping rules.
// Dependencies: crate::lexer
// ============================================================================

//! ## Overview
//! Declarations are `interface Name { … }` or `type Name = …` forms. Markers
//! lifted by the lexer scope assertion: a file marker opts every declaration
//! in, a declaration marker opts the next one in, and an ignore-changes
//! marker is legal only when the declaration is opted in. Unmarked
//! declarations are parsed like any other but flagged so lowering skips
//! them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::ExtractError;
use crate::lexer::Marker;
use crate::lexer::Spanned;
use crate::lexer::Token;

// ============================================================================
// SECTION: AST
// ============================================================================

/// One member of an object body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Member {
    /// Named field with optionality flag.
    Field {
        /// Property name.
        name: String,
        /// Whether the field carries a `?`.
        optional: bool,
        /// Declared type expression.
        ty: TypeExpr,
    },
    /// `[key: string]: T` signature.
    IndexSignature {
        /// Value type expression.
        value: TypeExpr,
    },
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeExpr {
    /// Bare name: keyword, builtin, or reference.
    Name(String),
    /// String literal type.
    StringLit(String),
    /// Number literal type.
    NumberLit(f64),
    /// Boolean literal type.
    BoolLit(bool),
    /// `Name<args>` application.
    Applied {
        /// Applied name.
        name: String,
        /// Type arguments.
        args: Vec<TypeExpr>,
        /// 1-based line of the application.
        line: usize,
    },
    /// `keyof T`.
    KeyOf(Box<TypeExpr>),
    /// `A | B | …`.
    Union(Vec<TypeExpr>),
    /// `A & B & …`.
    Intersection(Vec<TypeExpr>),
    /// Object body: fields and/or an index signature.
    Object {
        /// Members in source order.
        members: Vec<Member>,
        /// 1-based line of the opening brace.
        line: usize,
    },
    /// `{ [key in K]?: V }`.
    Mapped {
        /// Key source expression.
        key_source: Box<TypeExpr>,
        /// Value expression.
        value: Box<TypeExpr>,
        /// Whether the clause carries a `?`.
        optional: bool,
    },
    /// `T['k']` indexed access.
    IndexedAccess {
        /// Base expression.
        base: Box<TypeExpr>,
        /// Accessed key.
        key: String,
    },
}

/// Body of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeclBody {
    /// `interface Name extends … { … }`.
    Interface {
        /// Heritage names.
        heritage: Vec<String>,
        /// Members in source order.
        members: Vec<Member>,
    },
    /// `type Name = …`.
    Alias(TypeExpr),
}

/// One parsed declaration plus its marker state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Declaration {
    /// Declared name.
    pub name: String,
    /// Source file.
    pub file: String,
    /// 1-based line of the declaration keyword.
    pub line: usize,
    /// Parsed body.
    pub body: DeclBody,
    /// Whether a file or declaration marker applies.
    pub asserted: bool,
    /// Whether an ignore-changes marker applies.
    pub ignore_changes: bool,
}

// ============================================================================
// SECTION: Parser State
// ============================================================================

struct Parser<'a> {
    file: &'a str,
    tokens: &'a [Spanned],
    position: usize,
}

/// Parses every declaration in one file's token stream.
pub(crate) fn parse_declarations(
    file: &str,
    tokens: &[Spanned],
) -> Result<Vec<Declaration>, ExtractError> {
    let mut parser = Parser {
        file,
        tokens,
        position: 0,
    };
    parser.parse_file()
}

impl Parser<'_> {
    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|spanned| &spanned.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset).map(|spanned| &spanned.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(1, |spanned| spanned.line)
    }

    fn error(&self, message: &str) -> ExtractError {
        ExtractError::Parse {
            file: self.file.to_string(),
            line: self.line(),
            message: message.to_string(),
        }
    }

    fn expect(&mut self, expected: &Token, description: &str) -> Result<(), ExtractError> {
        if self.peek() == Some(expected) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {description}")))
        }
    }

    fn expect_ident(&mut self, description: &str) -> Result<String, ExtractError> {
        match self.peek() {
            Some(Token::Ident(word)) => {
                let word = word.clone();
                self.position += 1;
                Ok(word)
            }
            _ => Err(self.error(&format!("expected {description}"))),
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(found)) if found == word) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_file(&mut self) -> Result<Vec<Declaration>, ExtractError> {
        let mut declarations = Vec::new();
        let mut file_marker = false;
        let mut declaration_marker = false;
        let mut ignore_marker = false;
        let mut ignore_marker_line = 1usize;

        while let Some(token) = self.peek() {
            match token {
                Token::Marker(Marker::File) => {
                    file_marker = true;
                    self.position += 1;
                }
                Token::Marker(Marker::Declaration) => {
                    declaration_marker = true;
                    self.position += 1;
                }
                Token::Marker(Marker::IgnoreChanges) => {
                    ignore_marker = true;
                    ignore_marker_line = self.line();
                    self.position += 1;
                }
                Token::Ident(word) if word == "export" => {
                    self.position += 1;
                }
                Token::Ident(word) if word == "interface" || word == "type" => {
                    let asserted = file_marker || declaration_marker;
                    if ignore_marker && !asserted {
                        return Err(ExtractError::IgnoreChangesWithoutMarker {
                            file: self.file.to_string(),
                            line: ignore_marker_line,
                        });
                    }
                    let mut declaration = self.parse_declaration()?;
                    declaration.asserted = asserted;
                    declaration.ignore_changes = ignore_marker;
                    declarations.push(declaration);
                    declaration_marker = false;
                    ignore_marker = false;
                }
                Token::Semi => {
                    self.position += 1;
                }
                _ => return Err(self.error("expected a type declaration")),
            }
        }
        Ok(declarations)
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ExtractError> {
        let line = self.line();
        let keyword = self.expect_ident("'interface' or 'type'")?;
        let name = self.expect_ident("a declaration name")?;
        if self.peek() == Some(&Token::Lt) {
            return Err(ExtractError::GenericDeclaration {
                file: self.file.to_string(),
                line,
            });
        }

        let body = if keyword == "interface" {
            let mut heritage = Vec::new();
            if self.eat_ident("extends") {
                heritage.push(self.expect_ident("a base type name")?);
                while self.peek() == Some(&Token::Comma) {
                    self.position += 1;
                    heritage.push(self.expect_ident("a base type name")?);
                }
            }
            self.expect(&Token::LBrace, "'{'")?;
            let members = self.parse_members()?;
            self.expect(&Token::RBrace, "'}'")?;
            DeclBody::Interface {
                heritage,
                members,
            }
        } else {
            self.expect(&Token::Eq, "'='")?;
            let ty = self.parse_type()?;
            if self.peek() == Some(&Token::Semi) {
                self.position += 1;
            }
            DeclBody::Alias(ty)
        };

        Ok(Declaration {
            name,
            file: self.file.to_string(),
            line,
            body,
            asserted: false,
            ignore_changes: false,
        })
    }

    // ------------------------------------------------------------------
    // Object members
    // ------------------------------------------------------------------

    fn parse_members(&mut self) -> Result<Vec<Member>, ExtractError> {
        let mut members = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) | None => break,
                Some(Token::LBracket) => {
                    members.push(self.parse_index_signature()?);
                }
                _ => {
                    members.push(self.parse_field()?);
                }
            }
        }
        Ok(members)
    }

    fn parse_index_signature(&mut self) -> Result<Member, ExtractError> {
        self.expect(&Token::LBracket, "'['")?;
        self.expect_ident("an index signature key name")?;
        self.expect(&Token::Colon, "':'")?;
        let key_type = self.expect_ident("'string'")?;
        if key_type != "string" {
            return Err(self.error("index signature keys must be 'string'"));
        }
        self.expect(&Token::RBracket, "']'")?;
        self.expect(&Token::Colon, "':'")?;
        let value = self.parse_type()?;
        self.eat_member_terminator();
        Ok(Member::IndexSignature {
            value,
        })
    }

    fn parse_field(&mut self) -> Result<Member, ExtractError> {
        // 'readonly' is a modifier only when another name follows it.
        if matches!(self.peek(), Some(Token::Ident(word)) if word == "readonly")
            && matches!(self.peek_at(1), Some(Token::Ident(_) | Token::Str(_)))
        {
            self.position += 1;
        }
        let name = match self.peek() {
            Some(Token::Ident(word)) => word.clone(),
            Some(Token::Str(text)) => text.clone(),
            _ => return Err(self.error("expected a field name")),
        };
        self.position += 1;
        let optional = if self.peek() == Some(&Token::Question) {
            self.position += 1;
            true
        } else {
            false
        };
        self.expect(&Token::Colon, "':'")?;
        let ty = self.parse_type()?;
        self.eat_member_terminator();
        Ok(Member::Field {
            name,
            optional,
            ty,
        })
    }

    fn eat_member_terminator(&mut self) {
        if matches!(self.peek(), Some(Token::Semi | Token::Comma)) {
            self.position += 1;
        }
    }

    // ------------------------------------------------------------------
    // Type expressions
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeExpr, ExtractError> {
        // Tolerate the leading pipe of multi-line union declarations.
        if self.peek() == Some(&Token::Pipe) {
            self.position += 1;
        }
        let first = self.parse_intersection()?;
        if self.peek() != Some(&Token::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.peek() == Some(&Token::Pipe) {
            self.position += 1;
            members.push(self.parse_intersection()?);
        }
        Ok(TypeExpr::Union(members))
    }

    fn parse_intersection(&mut self) -> Result<TypeExpr, ExtractError> {
        let first = self.parse_postfix()?;
        if self.peek() != Some(&Token::Amp) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.peek() == Some(&Token::Amp) {
            self.position += 1;
            members.push(self.parse_postfix()?);
        }
        Ok(TypeExpr::Intersection(members))
    }

    fn parse_postfix(&mut self) -> Result<TypeExpr, ExtractError> {
        let mut base = self.parse_primary()?;
        while self.peek() == Some(&Token::LBracket) {
            match self.peek_at(1) {
                Some(Token::RBracket) => {
                    self.position += 2;
                    base = TypeExpr::Applied {
                        name: "Array".to_string(),
                        args: vec![base],
                        line: self.line(),
                    };
                }
                Some(Token::Str(key)) => {
                    let key = key.clone();
                    self.position += 2;
                    self.expect(&Token::RBracket, "']'")?;
                    base = TypeExpr::IndexedAccess {
                        base: Box::new(base),
                        key,
                    };
                }
                _ => return Err(self.error("expected ']' or a string key")),
            }
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<TypeExpr, ExtractError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.position += 1;
                let inner = self.parse_type()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::LBrace) => self.parse_object(),
            Some(Token::Str(text)) => {
                let text = text.clone();
                self.position += 1;
                Ok(TypeExpr::StringLit(text))
            }
            Some(Token::Num(value)) => {
                let value = *value;
                self.position += 1;
                Ok(TypeExpr::NumberLit(value))
            }
            Some(Token::Ident(word)) => {
                let word = word.clone();
                let line = self.line();
                self.position += 1;
                match word.as_str() {
                    "keyof" => Ok(TypeExpr::KeyOf(Box::new(self.parse_postfix()?))),
                    "readonly" => self.parse_postfix(),
                    "true" => Ok(TypeExpr::BoolLit(true)),
                    "false" => Ok(TypeExpr::BoolLit(false)),
                    _ => {
                        if self.peek() == Some(&Token::Lt) {
                            self.position += 1;
                            let mut args = vec![self.parse_type()?];
                            while self.peek() == Some(&Token::Comma) {
                                self.position += 1;
                                args.push(self.parse_type()?);
                            }
                            self.expect(&Token::Gt, "'>'")?;
                            Ok(TypeExpr::Applied {
                                name: word,
                                args,
                                line,
                            })
                        } else {
                            Ok(TypeExpr::Name(word))
                        }
                    }
                }
            }
            _ => Err(self.error("expected a type")),
        }
    }

    /// Parses `{ … }`: an object body or a mapped-type clause.
    fn parse_object(&mut self) -> Result<TypeExpr, ExtractError> {
        let line = self.line();
        self.expect(&Token::LBrace, "'{'")?;

        let mapped = self.peek() == Some(&Token::LBracket)
            && matches!(self.peek_at(1), Some(Token::Ident(_)))
            && matches!(self.peek_at(2), Some(Token::Ident(word)) if word == "in");
        if mapped {
            self.position += 2;
            self.expect_ident("'in'")?;
            let key_source = self.parse_type()?;
            self.expect(&Token::RBracket, "']'")?;
            let optional = if self.peek() == Some(&Token::Question) {
                self.position += 1;
                true
            } else {
                false
            };
            self.expect(&Token::Colon, "':'")?;
            let value = self.parse_type()?;
            self.eat_member_terminator();
            if self.peek() != Some(&Token::RBrace) {
                return Err(ExtractError::MappedWithMembers {
                    file: self.file.to_string(),
                    line,
                });
            }
            self.position += 1;
            return Ok(TypeExpr::Mapped {
                key_source: Box::new(key_source),
                value: Box::new(value),
                optional,
            });
        }

        let members = self.parse_members()?;
        self.expect(&Token::RBrace, "'}'")?;
        Ok(TypeExpr::Object {
            members,
            line,
        })
    }
}
