//! Event envelope decoding
//!
//! Every streamed message is a JSON object carrying a `_subject`
//! discriminator. Build lifecycle subjects (`build.create`,
//! `build.delete.done`, ...) decode to [`BuildEvent`]; anything else is a
//! per-component update and decodes to [`ComponentEvent`].

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Kind of build a lifecycle subject refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// `build.create`
    Create,
    /// `build.delete`
    Delete,
    /// `build.import`
    Import,
}

/// Phase of a build lifecycle subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// No suffix: the build has started
    Started,
    /// `.done` suffix
    Done,
    /// `.error` suffix
    Errored,
}

/// Parsed build-level discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSubject {
    pub kind: BuildKind,
    pub phase: BuildPhase,
}

impl FromStr for BuildSubject {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("build.").ok_or(())?;
        let (kind, phase) = match rest.split_once('.') {
            Some((kind, "done")) => (kind, BuildPhase::Done),
            Some((kind, "error")) => (kind, BuildPhase::Errored),
            Some(_) => return Err(()),
            None => (rest, BuildPhase::Started),
        };
        let kind = match kind {
            "create" => BuildKind::Create,
            "delete" => BuildKind::Delete,
            "import" => BuildKind::Import,
            _ => return Err(()),
        };
        Ok(Self { kind, phase })
    }
}

impl fmt::Display for BuildSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BuildKind::Create => "create",
            BuildKind::Delete => "delete",
            BuildKind::Import => "import",
        };
        match self.phase {
            BuildPhase::Started => write!(f, "build.{kind}"),
            BuildPhase::Done => write!(f, "build.{kind}.done"),
            BuildPhase::Errored => write!(f, "build.{kind}.error"),
        }
    }
}

/// One planned component change inside a build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Change {
    /// Resource type, e.g. `network`
    #[serde(rename = "_component")]
    pub component_type: String,

    #[serde(rename = "_action", default)]
    pub action: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// Build lifecycle message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub subject: BuildSubject,
    /// Build identifier
    pub id: String,
    /// Environment name
    pub name: String,
    /// Planned component changes, in server order
    pub changes: Vec<Change>,
}

/// Fields of a build event as they appear on the wire
#[derive(Deserialize)]
struct BuildPayload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    changes: Option<Vec<Change>>,
}

/// Component lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Running,
    Completed,
    Errored,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Action applied to a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentAction {
    Create,
    Update,
    Find,
    Delete,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Single resource transition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentEvent {
    #[serde(rename = "_component_id", default)]
    pub id: String,

    #[serde(rename = "_subject")]
    pub subject: String,

    /// Resource type, e.g. `instance`
    #[serde(rename = "_component", default)]
    pub component_type: String,

    /// `Unknown` when absent, as on message kinds the client does not track
    #[serde(rename = "_state", default)]
    pub state: ComponentState,

    #[serde(rename = "_action", default)]
    pub action: ComponentAction,

    #[serde(rename = "_provider", default)]
    pub provider: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub service: String,

    /// Sub-components discovered by a `find` action
    #[serde(default)]
    pub components: Vec<serde_json::Value>,
}

/// A decoded stream message
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Build(BuildEvent),
    Component(ComponentEvent),
}

/// Decode one raw message.
///
/// Returns `Ok(None)` for heartbeats (empty, whitespace-only, or `null`
/// payloads).
pub fn decode(raw: &[u8]) -> Result<Option<Event>, DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_slice(raw).map_err(|e| DecodeError::InvalidJson {
            error: e.to_string(),
        })?;
    if value.is_null() {
        return Ok(None);
    }

    let subject = value
        .get("_subject")
        .and_then(serde_json::Value::as_str)
        .ok_or(DecodeError::MissingSubject)?
        .to_string();

    let malformed = |e: serde_json::Error| DecodeError::Malformed {
        subject: subject.clone(),
        error: e.to_string(),
    };

    let event = if let Ok(build_subject) = subject.parse::<BuildSubject>() {
        let payload: BuildPayload = serde_json::from_value(value).map_err(malformed)?;
        Event::Build(BuildEvent {
            subject: build_subject,
            id: payload.id,
            name: payload.name,
            changes: payload.changes.unwrap_or_default(),
        })
    } else {
        Event::Component(serde_json::from_value(value).map_err(malformed)?)
    };

    tracing::debug!(subject = %subject, "decoded event");
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_subjects() {
        for (raw, kind, phase) in [
            ("build.create", BuildKind::Create, BuildPhase::Started),
            ("build.delete.done", BuildKind::Delete, BuildPhase::Done),
            ("build.import.error", BuildKind::Import, BuildPhase::Errored),
        ] {
            let subject: BuildSubject = raw.parse().unwrap();
            assert_eq!(subject, BuildSubject { kind, phase });
            assert_eq!(subject.to_string(), raw);
        }
    }

    #[test]
    fn test_non_build_subjects_rejected() {
        for raw in ["instance.create", "build.update", "build.create.partial", "build"] {
            assert!(raw.parse::<BuildSubject>().is_err(), "{raw}");
        }
    }

    #[test]
    fn test_heartbeats_are_skipped() {
        assert!(decode(b"").unwrap().is_none());
        assert!(decode(b"  \n").unwrap().is_none());
        assert!(decode(b"null").unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            decode(b"{not json"),
            Err(DecodeError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_missing_subject_is_error() {
        assert!(matches!(
            decode(br#"{"id":"1"}"#),
            Err(DecodeError::MissingSubject)
        ));
    }

    #[test]
    fn test_decode_build_event() {
        let raw = br#"{
            "_subject": "build.create",
            "id": "42",
            "name": "my-env",
            "changes": [{"_component": "network"}, {"_component": "instance", "extra": 1}],
            "unexpected": true
        }"#;
        let Some(Event::Build(build)) = decode(raw).unwrap() else {
            panic!("expected build event");
        };
        assert_eq!(build.id, "42");
        assert_eq!(build.name, "my-env");
        assert_eq!(build.subject.kind, BuildKind::Create);
        assert_eq!(build.changes.len(), 2);
        assert_eq!(build.changes[1].component_type, "instance");
    }

    #[test]
    fn test_decode_build_event_null_changes() {
        let raw = br#"{"_subject":"build.import","id":"7","name":"e","changes":null}"#;
        let Some(Event::Build(build)) = decode(raw).unwrap() else {
            panic!("expected build event");
        };
        assert!(build.changes.is_empty());
    }

    #[test]
    fn test_decode_component_event() {
        let raw = br#"{
            "_subject": "instance.create",
            "_component_id": "instance::web-1",
            "_component": "instance",
            "_state": "errored",
            "_action": "create",
            "_provider": "aws",
            "name": "web-1",
            "error": "timeout",
            "service": "svc-1"
        }"#;
        let Some(Event::Component(component)) = decode(raw).unwrap() else {
            panic!("expected component event");
        };
        assert_eq!(component.id, "instance::web-1");
        assert_eq!(component.component_type, "instance");
        assert_eq!(component.state, ComponentState::Errored);
        assert_eq!(component.action, ComponentAction::Create);
        assert_eq!(component.provider, "aws");
        assert_eq!(component.error.as_deref(), Some("timeout"));
        assert_eq!(component.service, "svc-1");
    }

    #[test]
    fn test_unknown_build_like_subject_falls_back_to_component() {
        let raw = br#"{"_subject":"build.update","_component":"network","_state":"running"}"#;
        assert!(matches!(decode(raw).unwrap(), Some(Event::Component(_))));
    }

    #[test]
    fn test_unknown_state_and_action_tolerated() {
        let raw = br#"{"_subject":"x","_component":"vpc","_state":"paused","_action":"sync"}"#;
        let Some(Event::Component(component)) = decode(raw).unwrap() else {
            panic!("expected component event");
        };
        assert_eq!(component.state, ComponentState::Unknown);
        assert_eq!(component.action, ComponentAction::Unknown);
    }

    #[test]
    fn test_unrecognized_message_kind_tolerated() {
        let raw = br#"{"_subject":"service.create","name":"svc"}"#;
        let Some(Event::Component(component)) = decode(raw).unwrap() else {
            panic!("expected component event");
        };
        assert_eq!(component.subject, "service.create");
        assert_eq!(component.state, ComponentState::Unknown);
        assert_eq!(component.action, ComponentAction::Unknown);
        assert!(component.component_type.is_empty());
    }

    #[test]
    fn test_component_wrong_field_type_is_malformed() {
        let raw = br#"{"_subject":"network.create","_component":"network","components":7}"#;
        assert!(matches!(decode(raw), Err(DecodeError::Malformed { .. })));
    }
}
