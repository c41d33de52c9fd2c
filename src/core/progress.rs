//! Per-stream build progress
//!
//! Tracks, for every resource type in a build, how many components have
//! finished out of how many were planned, plus the status word shown next
//! to the row. Updated once per [`ComponentEvent`].

use std::collections::BTreeMap;
use std::fmt;

use super::changes::{plural_label, targets};
use super::event::{
    BuildEvent, BuildKind, BuildPhase, BuildSubject, ComponentAction, ComponentEvent,
    ComponentState,
};

/// Status word of a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Pending,
    Creating,
    Updating,
    Searching,
    Deleting,
    Created,
    Updated,
    Found,
    None,
    Deleted,
    Error,
}

impl RowStatus {
    /// Whether the row has reached a final label
    pub fn is_done(self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Found | Self::None | Self::Deleted
        )
    }

    /// Whether work on the row is underway
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::Creating | Self::Updating | Self::Searching | Self::Deleting
        )
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Pending => "Pending",
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::Searching => "Searching",
            Self::Deleting => "Deleting",
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Found => "Found",
            Self::None => "None",
            Self::Deleted => "Deleted",
            Self::Error => "Error",
        };
        f.pad(word)
    }
}

/// Progress of one resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub current: usize,
    pub target: usize,
    pub status: RowStatus,
}

impl Row {
    fn new(target: usize) -> Self {
        Self {
            current: 0,
            target,
            status: RowStatus::Pending,
        }
    }

    /// Count one more finished component; never clamped to the target.
    fn complete_one(&mut self, in_progress: RowStatus, done: RowStatus) {
        self.current += 1;
        self.status = if self.current == self.target {
            done
        } else {
            in_progress
        };
    }
}

/// Overall build status derived from the latest build subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Applying,
    Destroying,
    Importing,
    Applied,
    Destroyed,
    Imported,
    Error,
    Unknown,
}

impl OverallStatus {
    pub fn from_subject(subject: Option<BuildSubject>) -> Self {
        let Some(subject) = subject else {
            return Self::Unknown;
        };
        match (subject.kind, subject.phase) {
            (_, BuildPhase::Errored) => Self::Error,
            (BuildKind::Create, BuildPhase::Started) => Self::Applying,
            (BuildKind::Delete, BuildPhase::Started) => Self::Destroying,
            (BuildKind::Import, BuildPhase::Started) => Self::Importing,
            (BuildKind::Create, BuildPhase::Done) => Self::Applied,
            (BuildKind::Delete, BuildPhase::Done) => Self::Destroyed,
            (BuildKind::Import, BuildPhase::Done) => Self::Imported,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Applied | Self::Destroyed | Self::Imported)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Applying => "Applying",
            Self::Destroying => "Destroying",
            Self::Importing => "Importing",
            Self::Applied => "Applied",
            Self::Destroyed => "Destroyed",
            Self::Imported => "Imported",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        };
        f.pad(word)
    }
}

/// A component that reported `errored`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFailure {
    pub component_type: String,
    pub name: String,
    pub message: String,
}

impl fmt::Display for ComponentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.component_type, self.name, self.message)
    }
}

/// Mutable progress for one build stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    /// Build identifier
    pub build_id: String,
    /// Environment name
    pub env_name: String,
    /// Latest build subject seen
    pub subject: BuildSubject,
    rows: BTreeMap<String, Row>,
    failures: Vec<ComponentFailure>,
}

impl ProgressState {
    /// Start tracking a build from its start event
    pub fn from_build(build: &BuildEvent) -> Self {
        // Raw types that share a label (`Network`, `network`) share a row.
        let mut rows = BTreeMap::new();
        for (component_type, target) in targets(build.subject.kind, &build.changes) {
            rows.entry(plural_label(&component_type))
                .or_insert_with(|| Row::new(0))
                .target += target;
        }

        Self {
            build_id: build.id.clone(),
            env_name: build.name.clone(),
            subject: build.subject,
            rows,
            failures: Vec::new(),
        }
    }

    /// Record a later build subject (`.done` / `.error`) on the same stream
    pub fn set_subject(&mut self, subject: BuildSubject) {
        self.subject = subject;
    }

    pub fn overall(&self) -> OverallStatus {
        OverallStatus::from_subject(Some(self.subject))
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(label, row)| (label.as_str(), row))
    }

    pub fn row(&self, label: &str) -> Option<&Row> {
        self.rows.get(label)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Component errors collected so far, in arrival order
    pub fn failures(&self) -> &[ComponentFailure] {
        &self.failures
    }

    /// Apply one component transition.
    ///
    /// Returns `false` when the event's resource type has no row, in which
    /// case nothing changes.
    pub fn apply(&mut self, event: &ComponentEvent) -> bool {
        let label = plural_label(&event.component_type);
        let Some(row) = self.rows.get_mut(&label) else {
            tracing::debug!(component = %event.component_type, "no row for component type");
            return false;
        };

        match (event.action, event.state) {
            (_, ComponentState::Errored) => {
                row.status = RowStatus::Error;
                self.failures.push(ComponentFailure {
                    component_type: event.component_type.clone(),
                    name: event.name.clone(),
                    message: event
                        .error
                        .clone()
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
            // An errored row keeps its label; counts still advance.
            (_, ComponentState::Running) if row.status == RowStatus::Error => {}
            (
                ComponentAction::Create | ComponentAction::Update | ComponentAction::Delete,
                ComponentState::Completed,
            ) if row.status == RowStatus::Error => {
                row.current += 1;
            }
            (ComponentAction::Find, ComponentState::Completed)
                if row.status == RowStatus::Error =>
            {
                row.current = event.components.len();
                row.target = event.components.len();
            }
            (ComponentAction::Create, ComponentState::Running) => row.status = RowStatus::Creating,
            (ComponentAction::Create, ComponentState::Completed) => {
                row.complete_one(RowStatus::Creating, RowStatus::Created);
            }
            (ComponentAction::Update, ComponentState::Running) => row.status = RowStatus::Updating,
            (ComponentAction::Update, ComponentState::Completed) => {
                row.complete_one(RowStatus::Updating, RowStatus::Updated);
            }
            (ComponentAction::Delete, ComponentState::Running) => row.status = RowStatus::Deleting,
            (ComponentAction::Delete, ComponentState::Completed) => {
                row.complete_one(RowStatus::Deleting, RowStatus::Deleted);
            }
            (ComponentAction::Find, ComponentState::Running) => row.status = RowStatus::Searching,
            (ComponentAction::Find, ComponentState::Completed) => {
                if event.components.is_empty() {
                    row.status = RowStatus::None;
                } else {
                    row.current = event.components.len();
                    row.target = event.components.len();
                    row.status = RowStatus::Found;
                }
            }
            (action, state) => {
                tracing::warn!(
                    ?action,
                    ?state,
                    component = %event.component_type,
                    "ignoring component transition"
                );
                return false;
            }
        }
        true
    }
}
