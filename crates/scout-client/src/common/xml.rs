//! XML document model
//!
//! Scout serves Rails-style XML. Documents are converted into a
//! `serde_json::Value` tree so resource records can be deserialized with serde:
//!
//! - element names become object keys, with `-` replaced by `_`
//! - `type="array"` elements become arrays of their children, even when empty
//! - `type="integer"`, `type="float"`/`"decimal"` and `type="boolean"` are typecast
//! - `nil="true"` elements become `null`
//! - repeated children of an ordinary element collapse into an array
//! - text-only elements become strings, empty elements become `null`

use crate::error::ScoutError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct Frame {
    name: String,
    type_hint: Option<String>,
    nil: bool,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, ScoutError> {
        let mut frame = Frame {
            name: normalize_key(&String::from_utf8_lossy(start.name().as_ref())),
            ..Frame::default()
        };

        for attr in start.attributes().flatten() {
            let value = attr.unescape_value()?;
            match attr.key.as_ref() {
                b"type" => frame.type_hint = Some(value.into_owned()),
                b"nil" => frame.nil = value == "true",
                _ => {}
            }
        }

        Ok(frame)
    }

    fn close(self) -> Result<(String, Value), ScoutError> {
        let Frame {
            name,
            type_hint,
            nil,
            children,
            text,
        } = self;

        if nil {
            return Ok((name, Value::Null));
        }

        if type_hint.as_deref() == Some("array") {
            let items = children.into_iter().map(|(_, value)| value).collect();
            return Ok((name, Value::Array(items)));
        }

        if !children.is_empty() {
            let mut object = Map::new();
            for (key, value) in children {
                insert_child(&mut object, key, value);
            }
            return Ok((name, Value::Object(object)));
        }

        let value = typecast(&name, type_hint.as_deref(), text)?;
        Ok((name, value))
    }
}

fn normalize_key(raw: &str) -> String {
    raw.replace('-', "_")
}

fn insert_child(object: &mut Map<String, Value>, key: String, value: Value) {
    match object.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            object.insert(key, value);
        }
    }
}

fn typecast(name: &str, type_hint: Option<&str>, text: String) -> Result<Value, ScoutError> {
    if text.is_empty() {
        return Ok(match type_hint {
            Some("string") => Value::String(text),
            _ => Value::Null,
        });
    }

    let invalid = |kind: &str, text: &str| {
        ScoutError::Xml(format!(
            "element <{}> declared as {} but contains {:?}",
            name, kind, text
        ))
    };

    match type_hint {
        Some("integer") => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("integer", &text)),
        Some("float") | Some("decimal") => {
            let parsed = text.parse::<f64>().map_err(|_| invalid("float", &text))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| invalid("float", &text))
        }
        Some("boolean") => match text.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("boolean", &text)),
        },
        _ => Ok(Value::String(text)),
    }
}

/// Parse an XML document into a value tree
///
/// The result is an object keyed by the root element's name. An empty body
/// yields an empty object.
pub fn parse_document(body: &str) -> Result<Value, ScoutError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    // The bottom frame collects the document's root element.
    let mut stack = vec![Frame::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (key, value) = Frame::open(&start)?.close()?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push((key, value));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(ScoutError::Xml("unbalanced closing tag".to_string()));
                }
                if let Some(frame) = stack.pop() {
                    let (key, value) = frame.close()?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push((key, value));
                    }
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(text.trim());
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(String::from_utf8_lossy(&data).trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ScoutError::Xml("unexpected end of document".to_string()));
    }

    let mut document = Map::new();
    for frame in stack {
        for (key, value) in frame.children {
            insert_child(&mut document, key, value);
        }
    }
    Ok(Value::Object(document))
}

/// Remove a top-level element from a parsed document
///
/// Returns `None` when the element is absent. An element that is present but
/// empty comes back as `Some(Value::Null)`.
pub fn take_root(document: &mut Value, name: &str) -> Option<Value> {
    document.as_object_mut().and_then(|root| root.remove(name))
}

/// Flatten a collection element into its items
///
/// Accepts the shapes Rails produces for a collection: a typed array, a
/// wrapper object holding one or many `item` children, or nothing at all.
/// A wrapper whose children are not `item` elements is an error.
pub fn into_list(value: Value, item: &str) -> Result<Vec<Value>, ScoutError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove(item) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) => Ok(Vec::new()),
            Some(single) => Ok(vec![single]),
            None if object.is_empty() => Ok(Vec::new()),
            None => {
                let found: Vec<&str> = object.keys().map(String::as_str).collect();
                Err(ScoutError::Api(format!(
                    "expected <{}> elements, found <{}>",
                    item,
                    found.join(">, <")
                )))
            }
        },
        other => Err(ScoutError::Api(format!(
            "expected <{}> elements, found {}",
            item, other
        ))),
    }
}

/// Remove a top-level collection element and flatten it into its items
///
/// A missing collection is treated as empty.
pub fn take_list(document: &mut Value, root: &str, item: &str) -> Result<Vec<Value>, ScoutError> {
    take_root(document, root)
        .map(|value| into_list(value, item))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Unwrap an element that must hold a record
pub fn expect_record(value: Value, element: &str) -> Result<Map<String, Value>, ScoutError> {
    match value {
        Value::Object(object) => Ok(object),
        Value::Null => Err(ScoutError::Api(format!("<{}> element is empty", element))),
        other => Err(ScoutError::Api(format!(
            "expected a <{}> record, got {}",
            element, other
        ))),
    }
}
