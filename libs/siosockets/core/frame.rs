//! Engine.IO text frame codec.
//!
//! Frame format: `<digit><optional "/namespace">[,<payload>]`
//!
//! Digits: `0` open, `1` close, `2` ping, `3` pong, `4` message,
//! `5` upgrade, `6` noop.
//!
//! Parsing and serialization are pure; no state, no side effects.

use crate::traits::{Result, SioError};
use serde_json::Value;

/// Engine.IO frame kind, the leading digit of every text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Open,
    Close,
    Ping,
    Pong,
    Message,
    Upgrade,
    Noop,
}

impl FrameKind {
    /// Map a wire digit to a kind. Digits outside `0..=6` are invalid.
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(FrameKind::Open),
            '1' => Some(FrameKind::Close),
            '2' => Some(FrameKind::Ping),
            '3' => Some(FrameKind::Pong),
            '4' => Some(FrameKind::Message),
            '5' => Some(FrameKind::Upgrade),
            '6' => Some(FrameKind::Noop),
            _ => None,
        }
    }

    pub fn as_digit(&self) -> char {
        match self {
            FrameKind::Open => '0',
            FrameKind::Close => '1',
            FrameKind::Ping => '2',
            FrameKind::Pong => '3',
            FrameKind::Message => '4',
            FrameKind::Upgrade => '5',
            FrameKind::Noop => '6',
        }
    }
}

/// Frame payload: decoded JSON when the payload text parses, otherwise the
/// raw text. Invalid JSON is never an error at this layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Best-effort JSON decode of the payload text.
    fn from_wire(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(raw.to_string()),
        }
    }

    /// Wire form: JSON-encoded only for composite values, bare string form
    /// otherwise.
    fn to_wire(&self) -> String {
        match self {
            Payload::Json(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
            Payload::Json(Value::String(s)) => s.clone(),
            Payload::Json(v) => v.to_string(),
            Payload::Text(s) => s.clone(),
        }
    }

    /// The decoded JSON value, if this payload parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Text(_) => None,
        }
    }
}

/// One wire-level unit of the realtime protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    pub namespace: String,
    pub payload: Option<Payload>,
}

/// Parse one raw text frame.
///
/// Empty input and a malformed or out-of-range leading digit are parse
/// failures. A payload that is not valid JSON is kept as raw text, never an
/// error.
pub fn parse(raw: &str) -> Result<Frame> {
    let mut chars = raw.chars();
    let first = chars
        .next()
        .ok_or_else(|| SioError::MalformedFrame("empty frame".to_string()))?;
    let kind = FrameKind::from_digit(first)
        .ok_or_else(|| SioError::MalformedFrame(format!("invalid frame kind '{}'", first)))?;

    let rest = &raw[first.len_utf8()..];

    let mut namespace = String::new();
    let mut payload = None;

    if rest.contains('/') {
        match rest.split_once(',') {
            Some((head, tail)) => {
                if head.starts_with('/') {
                    namespace = head.to_string();
                }
                payload = Some(Payload::from_wire(tail));
            }
            None => {
                if rest.starts_with('/') {
                    namespace = rest.to_string();
                }
            }
        }
    } else if let Some(tail) = rest.strip_prefix(',') {
        payload = Some(Payload::from_wire(tail));
    } else if !rest.is_empty() {
        payload = Some(Payload::from_wire(rest));
    }

    Ok(Frame {
        kind,
        namespace,
        payload,
    })
}

/// Serialize a frame for transmission. Deterministic, no side effects.
pub fn serialize(kind: FrameKind, namespace: &str, payload: Option<&Payload>) -> String {
    let mut out = String::new();
    out.push(kind.as_digit());
    out.push_str(namespace);
    if let Some(payload) = payload {
        out.push(',');
        out.push_str(&payload.to_wire());
    }
    out
}

/// The Socket.IO namespace-connect frame: `40<namespace>,`
///
/// The literal `0` after the message digit is the connect sub-marker
/// embedded directly in the frame text, not a separate field.
pub fn connect_frame(namespace: &str) -> String {
    format!("40{},", namespace)
}

/// The authentication event frame: `42<namespace>,["id","<session id>"]`
pub fn auth_frame(namespace: &str, session_id: &str) -> String {
    let payload = Value::Array(vec![
        Value::String("id".to_string()),
        Value::String(session_id.to_string()),
    ]);
    format!("42{},{}", namespace, payload)
}

/// An outbound event frame: `4<namespace>,[event, data?]`
pub fn event_frame(namespace: &str, event: &str, data: Option<Value>) -> String {
    let mut array = vec![Value::String(event.to_string())];
    if let Some(data) = data {
        array.push(data);
    }
    serialize(
        FrameKind::Message,
        namespace,
        Some(&Payload::Json(Value::Array(array))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_ping_is_bare() {
        let frame = parse("2").unwrap();
        assert_eq!(frame.kind, FrameKind::Ping);
        assert_eq!(frame.namespace, "");
        assert!(frame.payload.is_none());
    }

    #[test]
    fn parse_open_with_sid() {
        let frame = parse(r#"0{"sid":"x","pingInterval":25000}"#).unwrap();
        assert_eq!(frame.kind, FrameKind::Open);
        let payload = frame.payload.unwrap();
        assert_eq!(payload.as_json().unwrap()["sid"], json!("x"));
    }

    #[test]
    fn parse_namespaced_message() {
        let frame = parse(r#"4/line-ntp2-ws,["rawData",{"daySl":98.5}]"#).unwrap();
        assert_eq!(frame.kind, FrameKind::Message);
        assert_eq!(frame.namespace, "/line-ntp2-ws");
        let payload = frame.payload.unwrap();
        assert_eq!(payload.as_json().unwrap()[0], json!("rawData"));
    }

    #[test]
    fn parse_empty_input_fails() {
        assert!(matches!(parse(""), Err(SioError::MalformedFrame(_))));
    }

    #[test]
    fn parse_non_digit_fails() {
        assert!(matches!(parse("Zabc"), Err(SioError::MalformedFrame(_))));
    }

    #[test]
    fn parse_out_of_range_digit_fails() {
        assert!(matches!(parse("7hello"), Err(SioError::MalformedFrame(_))));
    }

    #[test]
    fn parse_invalid_json_payload_falls_back_to_text() {
        let frame = parse("4/ns,{not json").unwrap();
        assert_eq!(frame.payload, Some(Payload::Text("{not json".to_string())));
    }

    #[test]
    fn serialize_no_payload_has_no_separator() {
        assert_eq!(serialize(FrameKind::Pong, "", None), "3");
        assert_eq!(serialize(FrameKind::Message, "/ns", None), "4/ns");
    }

    #[test]
    fn serialize_scalar_payload_uses_string_form() {
        let payload = Payload::Json(json!("ready"));
        assert_eq!(serialize(FrameKind::Message, "/ns", Some(&payload)), "4/ns,ready");
    }

    #[test]
    fn round_trip_composite_payloads() {
        let cases = vec![
            (FrameKind::Message, "/ns", Some(Payload::Json(json!(["ev", {"a": 1}])))),
            (FrameKind::Message, "", Some(Payload::Json(json!({"sid": "abc"})))),
            (FrameKind::Open, "", Some(Payload::Json(json!({"sid": "x"})))),
            (FrameKind::Ping, "", None),
            (FrameKind::Close, "/break-nck-ntp-ws", None),
        ];
        for (kind, ns, payload) in cases {
            let wire = serialize(kind, ns, payload.as_ref());
            let frame = parse(&wire).unwrap();
            assert_eq!(frame.kind, kind);
            assert_eq!(frame.namespace, ns);
            assert_eq!(frame.payload, payload);
        }
    }

    #[test]
    fn connect_frame_wire_form() {
        assert_eq!(connect_frame("/line-ntp2-ws"), "40/line-ntp2-ws,");
    }

    #[test]
    fn auth_frame_wire_form() {
        assert_eq!(
            auth_frame("/break-nck-ntp-ws", "PHPSESSID123"),
            r#"42/break-nck-ntp-ws,["id","PHPSESSID123"]"#
        );
    }

    #[test]
    fn event_frame_without_data() {
        assert_eq!(event_frame("/ns", "refresh", None), r#"4/ns,["refresh"]"#);
    }

    #[test]
    fn event_frame_with_data() {
        assert_eq!(
            event_frame("/ns", "setLine", Some(json!(5))),
            r#"4/ns,["setLine",5]"#
        );
    }
}
