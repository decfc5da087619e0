//! XML-to-tree materialization for SOAP replies.

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    nil: bool,
}

/// Parse an XML document into a JSON-like tree: elements become objects
/// keyed by their qualified tag name, repeated siblings become arrays, text
/// content becomes strings, and `xsi:nil` elements become null. Attributes
/// other than `nil` are dropped; the normalizer never reads them.
pub fn to_value(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Frame> = vec![Frame {
        name: String::new(),
        children: Map::new(),
        text: String::new(),
        nil: false,
    }];

    loop {
        match reader.read_event().context("malformed XML in response")? {
            Event::Start(e) => stack.push(open_frame(&e)?),
            Event::Empty(e) => {
                let (name, value) = finish(open_frame(&e)?);
                attach(&mut stack.last_mut().expect("document frame").children, name, value);
            }
            Event::Text(t) => {
                let text = t.unescape().context("malformed text in response")?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::End(_) => {
                let frame = match stack.pop() {
                    Some(frame) if !stack.is_empty() => frame,
                    _ => bail!("unbalanced XML in response"),
                };
                let (name, value) = finish(frame);
                attach(&mut stack.last_mut().expect("document frame").children, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        bail!("unbalanced XML in response");
    }
    let root = stack.pop().expect("document frame");
    if root.children.is_empty() {
        bail!("empty XML document");
    }
    Ok(Value::Object(root.children))
}

fn open_frame(e: &BytesStart) -> Result<Frame> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut nil = false;
    for attr in e.attributes() {
        let attr = attr.context("malformed attribute in response")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "nil" || key.ends_with(":nil") {
            nil = attr
                .unescape_value()
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);
        }
    }
    Ok(Frame { name, children: Map::new(), text: String::new(), nil })
}

fn finish(frame: Frame) -> (String, Value) {
    let value = if frame.nil {
        Value::Null
    } else if !frame.children.is_empty() {
        Value::Object(frame.children)
    } else {
        Value::String(frame.text.trim().to_string())
    };
    (frame.name, value)
}

fn attach(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}
