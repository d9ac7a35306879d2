//! Argument translation.
//!
//! Turns a parameter sub-object into the ordered [`Argument`] list of a
//! [`Field`](crate::ast::Field). Scalars become typed arguments; filter
//! objects become pre-rendered comparison expressions.

use serde_json::{Map, Value};

use crate::ast::{Argument, ValueType};
use crate::params::is_truthy;

/// Filter operators, in the order they are emitted.
const FILTER_OPERATORS: [FilterOp; 7] = [
    FilterOp::Contains,
    FilterOp::StartsWith,
    FilterOp::EndsWith,
    FilterOp::Gt,
    FilterOp::Gte,
    FilterOp::Lt,
    FilterOp::Lte,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Contains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    fn key(self) -> &'static str {
        match self {
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        }
    }

    /// Render the expression. Single quotes in `operand` are doubled so it
    /// stays one SQL string literal.
    fn render(self, operand: &str) -> String {
        let operand = operand.replace('\'', "''");
        match self {
            FilterOp::Contains => format!("LIKE '%{}%'", operand),
            FilterOp::StartsWith => format!("LIKE '{}%'", operand),
            FilterOp::EndsWith => format!("LIKE '%{}'", operand),
            FilterOp::Gt => format!("> '{}'", operand),
            FilterOp::Gte => format!(">= '{}'", operand),
            FilterOp::Lt => format!("< '{}'", operand),
            FilterOp::Lte => format!("<= '{}'", operand),
        }
    }
}

/// Translate every truthy entry of `field` into arguments, in key order.
pub fn arguments(field: &Map<String, Value>) -> Vec<Argument> {
    let mut args = Vec::new();

    for (key, value) in field {
        if !is_truthy(value) {
            continue;
        }
        match value {
            Value::Object(filter) => args.extend(handle_filter(key, filter)),
            // Arrays carry no operators.
            Value::Array(_) => {}
            scalar => args.push(Argument::new(key, stringify(scalar), value_type(scalar))),
        }
    }

    args
}

/// Translate a filter object on `key` into one custom argument per operator.
///
/// Operands are quoted as SQL string literals; nothing else is escaped.
pub fn handle_filter(key: &str, filter: &Map<String, Value>) -> Vec<Argument> {
    FILTER_OPERATORS
        .iter()
        .filter_map(|op| {
            filter
                .get(op.key())
                .filter(|operand| is_truthy(operand))
                .map(|operand| Argument::custom(key, op.render(&stringify(operand))))
        })
        .collect()
}

/// Render a value the way it is spliced into argument text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn value_type(value: &Value) -> ValueType {
    match value {
        Value::Number(_) => ValueType::Number,
        Value::Bool(_) => ValueType::Boolean,
        _ => ValueType::String,
    }
}
