//! Model formulas (`y ~ x1 + x2`) and design-matrix construction
//!
//! The accepted language is the subset of Wilkinson/patsy notation used for
//! linear specifications:
//!
//! - `a + b` adds terms, `- b` removes a term
//! - `a:b` is the interaction (elementwise product) of `a` and `b`
//! - `a*b` expands to `a + b + a:b`
//! - `1` / `+ 1` keeps the intercept, `0` / `- 1` drops it
//! - `log(x)`, `exp(x)`, `sqrt(x)`, `abs(x)` transform a column; an `np.`
//!   prefix is accepted and kept in the term name
//!
//! The intercept is always reported as the term `Intercept`.

use crate::dataset::Dataset;
use crate::errors::{StatsError, StatsResult};
use std::fmt;

/// Name used for the constant term
pub const INTERCEPT: &str = "Intercept";

/// Elementwise transform applied to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Log,
    Exp,
    Sqrt,
    Abs,
}

impl Transform {
    fn from_name(name: &str) -> Option<Self> {
        match name.strip_prefix("np.").unwrap_or(name) {
            "log" => Some(Transform::Log),
            "exp" => Some(Transform::Exp),
            "sqrt" => Some(Transform::Sqrt),
            "abs" => Some(Transform::Abs),
            _ => None,
        }
    }

    fn apply(&self, v: f64) -> f64 {
        match self {
            Transform::Log => v.ln(),
            Transform::Exp => v.exp(),
            Transform::Sqrt => v.sqrt(),
            Transform::Abs => v.abs(),
        }
    }
}

/// A single column reference, optionally transformed
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub column: String,
    pub transform: Option<Transform>,
    label: String,
}

impl Factor {
    fn column(name: &str) -> Self {
        Self {
            column: name.to_string(),
            transform: None,
            label: name.to_string(),
        }
    }

    fn call(function: &str, transform: Transform, column: &str) -> Self {
        Self {
            column: column.to_string(),
            transform: Some(transform),
            label: format!("{}({})", function, column),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn evaluate(&self, data: &Dataset) -> StatsResult<Vec<f64>> {
        let values = data
            .column(&self.column)
            .ok_or_else(|| StatsError::UnknownColumn(self.column.clone()))?;
        Ok(match self.transform {
            Some(t) => values.iter().map(|&v| t.apply(v)).collect(),
            None => values.to_vec(),
        })
    }
}

/// A design-matrix column: the product of one or more factors
#[derive(Debug, Clone)]
pub struct Term {
    factors: Vec<Factor>,
}

impl Term {
    fn single(factor: Factor) -> Self {
        Self {
            factors: vec![factor],
        }
    }

    /// Interaction of two terms; repeated factors appear once
    fn interact(&self, other: &Term) -> Term {
        let mut factors = self.factors.clone();
        for f in &other.factors {
            if !factors.iter().any(|g| g.label == f.label) {
                factors.push(f.clone());
            }
        }
        Term { factors }
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn name(&self) -> String {
        self.factors
            .iter()
            .map(|f| f.label.as_str())
            .collect::<Vec<_>>()
            .join(":")
    }

    fn evaluate(&self, data: &Dataset) -> StatsResult<Vec<f64>> {
        let mut values = vec![1.0; data.n_rows()];
        for factor in &self.factors {
            for (v, f) in values.iter_mut().zip(factor.evaluate(data)?) {
                *v *= f;
            }
        }
        Ok(values)
    }
}

/// `a:b` and `b:a` are the same term
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.factors.len() == other.factors.len()
            && self
                .factors
                .iter()
                .all(|f| other.factors.iter().any(|g| g.label == f.label))
    }
}

/// A parsed `response ~ terms` formula
#[derive(Debug, Clone)]
pub struct Formula {
    text: String,
    pub response: Factor,
    pub terms: Vec<Term>,
    pub intercept: bool,
}

impl Formula {
    /// Parse a full `response ~ rhs` formula
    pub fn parse(text: &str) -> StatsResult<Self> {
        let invalid = |message: &str| StatsError::InvalidFormula {
            formula: text.to_string(),
            message: message.to_string(),
        };

        let (lhs, rhs) = text
            .split_once('~')
            .ok_or_else(|| invalid("missing '~' between response and terms"))?;
        if rhs.contains('~') {
            return Err(invalid("more than one '~'"));
        }

        let mut parser = Parser::new(text, lhs)?;
        let response = parser.factor()?;
        if !parser.at_end() {
            return Err(invalid("response must be a single column"));
        }

        let mut parser = Parser::new(text, rhs)?;
        let (terms, intercept) = parser.terms()?;

        Ok(Self {
            text: text.trim().to_string(),
            response,
            terms,
            intercept,
        })
    }

    /// Parse `"{response} ~ {rhs}"`
    pub fn from_parts(response: &str, rhs: &str) -> StatsResult<Self> {
        Self::parse(&format!("{} ~ {}", response, rhs))
    }

    /// Names of the design-matrix columns, intercept first
    pub fn term_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            names.push(INTERCEPT.to_string());
        }
        names.extend(self.terms.iter().map(Term::name));
        names
    }

    /// Evaluate the formula against `data`, dropping rows with NaN/Inf values
    pub fn design(&self, data: &Dataset) -> StatsResult<Design> {
        let y = self.response.evaluate(data)?;
        let columns = self
            .terms
            .iter()
            .map(|t| t.evaluate(data))
            .collect::<StatsResult<Vec<_>>>()?;

        let valid_indices: Vec<usize> = (0..data.n_rows())
            .filter(|&i| y[i].is_finite() && columns.iter().all(|col| col[i].is_finite()))
            .collect();

        if valid_indices.is_empty() {
            return Err(StatsError::NoValidData);
        }

        Ok(Design {
            terms: self.term_names(),
            intercept: self.intercept,
            y: valid_indices.iter().map(|&i| y[i]).collect(),
            x: columns
                .iter()
                .map(|col| valid_indices.iter().map(|&i| col[i]).collect())
                .collect(),
            n_dropped: data.n_rows() - valid_indices.len(),
        })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Numeric design for one formula, restricted to complete rows
#[derive(Debug, Clone)]
pub struct Design {
    /// Parameter names; `Intercept` first when `intercept` is set
    pub terms: Vec<String>,
    pub intercept: bool,
    /// Response values
    pub y: Vec<f64>,
    /// Term columns, one Vec per non-intercept term (column-major)
    pub x: Vec<Vec<f64>>,
    /// Rows removed because of NaN/Inf values
    pub n_dropped: usize,
}

impl Design {
    pub fn n_observations(&self) -> usize {
        self.y.len()
    }

    /// Number of estimated parameters, intercept included
    pub fn n_params(&self) -> usize {
        self.terms.len()
    }

    /// Row `i` of the full design matrix, with a leading 1 for the intercept
    pub fn row(&self, i: usize) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.n_params());
        if self.intercept {
            row.push(1.0);
        }
        row.extend(self.x.iter().map(|col| col[i]));
        row
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Plus,
    Minus,
    Colon,
    Star,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | ':' | '*' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    ':' => Token::Colon,
                    '*' => Token::Star,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            c if c.is_ascii_digit() => {
                let mut s = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        s.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(s));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut s = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '.' {
                        s.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(s));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

/// Recursive-descent parser over one side of a formula
struct Parser<'a> {
    formula: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(formula: &'a str, source: &str) -> StatsResult<Self> {
        let tokens = tokenize(source).map_err(|message| StatsError::InvalidFormula {
            formula: formula.to_string(),
            message,
        })?;
        Ok(Self {
            formula,
            tokens,
            pos: 0,
        })
    }

    fn error(&self, message: impl Into<String>) -> StatsError {
        StatsError::InvalidFormula {
            formula: self.formula.to_string(),
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> StatsResult<()> {
        match self.next() {
            Some(ref t) if *t == expected => Ok(()),
            Some(t) => Err(self.error(format!("expected {:?}, found {:?}", expected, t))),
            None => Err(self.error(format!("expected {:?}, found end of formula", expected))),
        }
    }

    /// rhs := ['-'] item (('+' | '-') item)*
    fn terms(&mut self) -> StatsResult<(Vec<Term>, bool)> {
        if self.at_end() {
            return Err(self.error("no terms on the right-hand side"));
        }

        let mut terms: Vec<Term> = Vec::new();
        let mut intercept = true;
        let mut negate = false;

        if self.peek() == Some(&Token::Minus) {
            self.next();
            negate = true;
        }

        loop {
            match self.item()? {
                Item::Constant(keep) => intercept = keep != negate,
                Item::Terms(items) => {
                    for term in items {
                        if negate {
                            terms.retain(|t| *t != term);
                        } else if !terms.contains(&term) {
                            terms.push(term);
                        }
                    }
                }
            }

            match self.next() {
                None => break,
                Some(Token::Plus) => negate = false,
                Some(Token::Minus) => negate = true,
                Some(t) => return Err(self.error(format!("unexpected {:?}", t))),
            }
            if self.at_end() {
                return Err(self.error("dangling operator at end of formula"));
            }
        }

        Ok((terms, intercept))
    }

    /// item := '0' | '1' | interaction ('*' interaction)*
    fn item(&mut self) -> StatsResult<Item> {
        if let Some(Token::Number(n)) = self.peek().cloned() {
            self.next();
            return match n.as_str() {
                "0" => Ok(Item::Constant(false)),
                "1" => Ok(Item::Constant(true)),
                other => Err(self.error(format!("numeric term '{}' is not 0 or 1", other))),
            };
        }

        let mut terms = vec![self.interaction()?];
        while self.peek() == Some(&Token::Star) {
            self.next();
            let right = self.interaction()?;
            let mut expanded = terms.clone();
            expanded.push(right.clone());
            expanded.extend(terms.iter().map(|t| t.interact(&right)));
            terms = Vec::new();
            for term in expanded {
                if !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }
        Ok(Item::Terms(terms))
    }

    /// interaction := factor (':' factor)*
    fn interaction(&mut self) -> StatsResult<Term> {
        let mut term = Term::single(self.factor()?);
        while self.peek() == Some(&Token::Colon) {
            self.next();
            term = term.interact(&Term::single(self.factor()?));
        }
        Ok(term)
    }

    /// factor := ident | ident '(' ident ')'
    fn factor(&mut self) -> StatsResult<Factor> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            Some(t) => return Err(self.error(format!("expected a variable, found {:?}", t))),
            None => return Err(self.error("expected a variable, found end of formula")),
        };

        if self.peek() != Some(&Token::LParen) {
            return Ok(Factor::column(&name));
        }

        let transform = Transform::from_name(&name)
            .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
        self.next();
        let column = match self.next() {
            Some(Token::Ident(column)) => column,
            _ => return Err(self.error(format!("{}() expects a column name", name))),
        };
        self.expect(Token::RParen)?;
        Ok(Factor::call(&name, transform, &column))
    }
}

enum Item {
    Constant(bool),
    Terms(Vec<Term>),
}
