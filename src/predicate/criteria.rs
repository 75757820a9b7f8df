//! Predicate definitions and evaluation

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TabulaError};
use crate::schema::{Record, TableSchema, Value};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Textual form of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Whether `ordering` (record value vs literal) satisfies this operator
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }

    /// Whether the operator is a range comparison
    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            other => Err(TabulaError::UnknownOperator(other.to_string())),
        }
    }
}

/// A single `field <op> literal` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Operator,
    pub literal: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: Operator, literal: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            literal: literal.into(),
        }
    }

    /// Parse `field<op>literal`, e.g. `age>=21` or `name = bob`
    ///
    /// The literal is kept as a string and coerced against the schema when
    /// the predicate is compiled.
    pub fn parse(expr: &str) -> Result<Self> {
        let pos = expr
            .find(['=', '<', '>', '!'])
            .ok_or_else(|| TabulaError::UnknownOperator(expr.to_string()))?;

        let field = expr[..pos].trim();
        let rest = &expr[pos..];

        let op_len = match rest.get(..2) {
            Some(two) if two.parse::<Operator>().is_ok() => 2,
            _ => 1,
        };
        let op: Operator = rest[..op_len].parse()?;
        let literal = rest[op_len..].trim();

        Ok(Self::new(field, op, literal))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.literal)
    }
}

/// A predicate resolved against a schema
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    field: String,
    op: Operator,
    /// `None` when the literal does not fit the field type
    literal: Option<Value>,
}

impl CompiledPredicate {
    /// Evaluate against a decoded record
    pub fn matches(&self, record: &Record) -> bool {
        let (Some(literal), Some(value)) = (&self.literal, record.get(&self.field)) else {
            return false;
        };

        match value.compare(literal) {
            Some(ordering) => self.op.matches(ordering),
            None => false,
        }
    }
}

/// Resolve every predicate against `schema`
///
/// Fails with `UnknownField` if any predicate names an undeclared field.
pub fn compile(predicates: &[Predicate], schema: &TableSchema) -> Result<Vec<CompiledPredicate>> {
    predicates
        .iter()
        .map(|p| {
            let field = schema
                .field(&p.field)
                .ok_or_else(|| TabulaError::UnknownField(p.field.clone()))?;

            let literal = field
                .field_type
                .coerce(p.literal.clone())
                .filter(|v| !v.is_null());

            Ok(CompiledPredicate {
                field: field.name.clone(),
                op: p.op,
                literal,
            })
        })
        .collect()
}

/// Evaluate the conjunction of `predicates` against one record
pub fn evaluate(predicates: &[Predicate], record: &Record, schema: &TableSchema) -> Result<bool> {
    let compiled = compile(predicates, schema)?;
    Ok(compiled.iter().all(|p| p.matches(record)))
}
