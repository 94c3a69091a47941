//! JSON S-expression decoding
//!
//! Decodes `Ripper.sexp(source).to_json` output into `AstNode`s. Ruby
//! symbols arrive as JSON strings, so an array whose first element is a
//! string is a node, a two-integer array is a `[line, column]` position and
//! any other array is a plain list.

use super::node::{AstNode, Child, NodeKind, Position};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Decode one JSON value into a child slot
pub fn decode(value: &Value) -> Result<Child> {
    match value {
        Value::Null => Ok(Child::Nil),
        Value::Bool(flag) => Ok(Child::Flag(*flag)),
        Value::Number(n) => Ok(Child::Literal(n.to_string())),
        Value::String(s) => Ok(Child::Literal(s.clone())),
        Value::Array(items) => decode_array(items),
        Value::Object(_) => Err(Error::Parse(
            "unexpected JSON object in S-expression".to_string(),
        )),
    }
}

fn decode_array(items: &[Value]) -> Result<Child> {
    if let Some(position) = as_position(items) {
        return Ok(Child::Position(position));
    }

    match items.first() {
        Some(Value::String(tag)) => {
            let children = items[1..].iter().map(decode).collect::<Result<Vec<_>>>()?;
            Ok(Child::Node(AstNode::new(NodeKind::from_tag(tag), children)))
        }
        _ => Ok(Child::List(items.iter().map(decode).collect::<Result<Vec<_>>>()?)),
    }
}

fn as_position(items: &[Value]) -> Option<Position> {
    match items {
        [Value::Number(line), Value::Number(column)] => Some(Position {
            line: u32::try_from(line.as_u64()?).ok()?,
            column: u32::try_from(column.as_u64()?).ok()?,
        }),
        _ => None,
    }
}

/// Parse a serialized `Ripper.sexp` dump into its root node.
///
/// Ripper returns `nil` for source it cannot parse, which shows up here as
/// a JSON `null` root. Nesting depth is unbounded: every call, block and
/// body adds a few levels, so ordinary files go well past serde_json's
/// default limit of 128. The stack grows on demand instead.
pub fn parse_program(text: &str) -> Result<AstNode> {
    let value = read_value(text)?;
    match decode(&value)? {
        Child::Node(node) => Ok(node),
        Child::Nil => Err(Error::Parse("source has a syntax error (empty S-expression)".to_string())),
        _ => Err(Error::Parse("S-expression root is not a node".to_string())),
    }
}

fn read_value(text: &str) -> Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}
