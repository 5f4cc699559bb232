//! Webhook acknowledgement decoding.
//!
//! The webhook answers with either a JSON object or an XML document carrying
//! `code` and `msg`. Decoding tries JSON, then XML, then gives up with
//! [`PipelineError::ParseFailure`].

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use crate::error::{PipelineError, Result};

pub const SUCCESS_CODE: &str = "200";
const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckFormat {
    Json,
    Xml,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acknowledgement {
    pub format: AckFormat,
    pub code: Option<String>,
    pub msg: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { code: Option<String>, message: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

impl Acknowledgement {
    pub fn outcome(&self) -> DeliveryOutcome {
        if self.code.as_deref() == Some(SUCCESS_CODE) {
            return DeliveryOutcome::Delivered;
        }
        let message = match (&self.code, &self.msg) {
            (None, _) if self.format == AckFormat::Xml => "response is missing a code element".to_string(),
            (_, Some(m)) => m.clone(),
            (_, None) => UNKNOWN_ERROR.to_string(),
        };
        DeliveryOutcome::Rejected {
            code: self.code.clone(),
            message,
        }
    }
}

pub fn decode_ack(body: &str) -> Result<Acknowledgement> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return from_json(value);
    }
    from_xml(body).map_err(|reason| {
        PipelineError::ParseFailure(format!(
            "response is neither valid JSON nor valid XML ({reason}): {body}"
        ))
    })
}

fn from_json(value: Value) -> Result<Acknowledgement> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(PipelineError::ParseFailure(format!(
                "JSON acknowledgement is not an object: {other}"
            )))
        }
    };
    let code = map.get("code").map(|c| match c {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    let msg = map.get("msg").map(|m| match m {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    Ok(Acknowledgement {
        format: AckFormat::Json,
        code,
        msg,
    })
}

/// Reads the first `code` and `msg` elements below the root of a single-rooted document.
/// The root element itself never counts as either.
fn from_xml(body: &str) -> std::result::Result<Acknowledgement, String> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut root_closed = false;
    let mut seen_root = false;
    let mut code: Option<String> = None;
    let mut msg: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root_closed {
                    return Err("content after document element".into());
                }
                seen_root = true;
                stack.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
            }
            Ok(Event::Empty(_)) => {
                if root_closed {
                    return Err("content after document element".into());
                }
                if stack.is_empty() {
                    seen_root = true;
                    root_closed = true;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                if stack.is_empty() {
                    root_closed = true;
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| e.to_string())?.to_string();
                if stack.is_empty() {
                    return Err("text outside document element".into());
                }
                capture(&stack, text, &mut code, &mut msg);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                capture(&stack, text, &mut code, &mut msg);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    if !seen_root {
        return Err("no document element".into());
    }
    if !stack.is_empty() {
        return Err(format!("unclosed element <{}>", stack.join("><")));
    }
    Ok(Acknowledgement {
        format: AckFormat::Xml,
        code,
        msg,
    })
}

fn capture(stack: &[String], text: String, code: &mut Option<String>, msg: &mut Option<String>) {
    if stack.len() < 2 {
        return;
    }
    match stack.last().map(String::as_str) {
        Some("code") if code.is_none() => *code = Some(text),
        Some("msg") if msg.is_none() => *msg = Some(text),
        _ => {}
    }
}
