//! Field-name to value mapping for entities sent to a remote record store.
//!
//! A [`Record`] is the flat shape a hosted document database deals in: a record
//! type, an optional record name and a bag of JSON fields. Entities opt in by
//! implementing [`Recordable`].

use crate::domain::{EntityKind, Project, ProjectId, Todo, TodoId};
use chrono::{DateTime, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while rebuilding an entity from a record
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected a {expected} record, got {found}")]
    WrongType { expected: EntityKind, found: EntityKind },

    #[error("{kind} record is missing field '{field}'")]
    MissingField { kind: EntityKind, field: &'static str },

    #[error("{kind} record has an invalid '{field}': {reason}")]
    InvalidField {
        kind: EntityKind,
        field: &'static str,
        reason: String,
    },
}

/// A raw record as exchanged with the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_type: EntityKind,
    /// Record name; None until the remote store has assigned one
    pub id: Option<String>,
    pub fields: Map<String, Value>,
}

/// Entities that can be mapped to and from a [`Record`]
pub trait Recordable: Sized {
    const RECORD_TYPE: EntityKind;

    /// Stable identity used as the record name
    fn record_id(&self) -> Option<String>;

    /// Field name to value mapping
    fn fields(&self) -> Map<String, Value>;

    /// Rebuild the entity from a raw record
    fn from_record(record: &Record) -> Result<Self, RecordError>;

    fn to_record(&self) -> Record {
        Record {
            record_type: Self::RECORD_TYPE,
            id: self.record_id(),
            fields: self.fields(),
        }
    }
}

/// Typed accessor over a record's fields
struct FieldReader<'a> {
    kind: EntityKind,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn open(record: &'a Record, kind: EntityKind) -> Result<Self, RecordError> {
        if record.record_type != kind {
            return Err(RecordError::WrongType {
                expected: kind,
                found: record.record_type,
            });
        }
        Ok(Self {
            kind,
            fields: &record.fields,
        })
    }

    /// Optional field; absent and null both read as None
    fn optional<T: DeserializeOwned>(&self, field: &'static str) -> Result<Option<T>, RecordError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| RecordError::InvalidField {
                    kind: self.kind,
                    field,
                    reason: e.to_string(),
                }),
        }
    }

    fn required<T: DeserializeOwned>(&self, field: &'static str) -> Result<T, RecordError> {
        self.optional(field)?.ok_or(RecordError::MissingField {
            kind: self.kind,
            field,
        })
    }

    fn flag(&self, field: &'static str) -> Result<bool, RecordError> {
        Ok(self.optional(field)?.unwrap_or(false))
    }
}

fn record_name<T: std::str::FromStr>(record: &Record, kind: EntityKind) -> Result<T, RecordError>
where
    T::Err: std::fmt::Display,
{
    let name = record.id.as_deref().ok_or(RecordError::MissingField { kind, field: "id" })?;
    name.parse().map_err(|e: T::Err| RecordError::InvalidField {
        kind,
        field: "id",
        reason: e.to_string(),
    })
}

fn put<T: Serialize>(fields: &mut Map<String, Value>, name: &str, value: T) {
    fields.insert(name.to_string(), serde_json::to_value(value).unwrap_or(Value::Null));
}

impl Recordable for Project {
    const RECORD_TYPE: EntityKind = EntityKind::Project;

    fn record_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        put(&mut fields, "category", &self.category);
        put(&mut fields, "goals", &self.goals);
        put(&mut fields, "startedAt", self.started_at);
        put(&mut fields, "endedAt", self.ended_at);
        put(&mut fields, "isBookmarked", self.is_bookmarked);
        put(&mut fields, "isEnded", self.ended);
        fields
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        let reader = FieldReader::open(record, Self::RECORD_TYPE)?;
        Ok(Self {
            id: record_name::<ProjectId>(record, Self::RECORD_TYPE)?,
            category: reader.optional("category")?.unwrap_or_default(),
            goals: reader.optional("goals")?,
            started_at: reader.optional::<DateTime<Local>>("startedAt")?,
            ended_at: reader.optional::<DateTime<Local>>("endedAt")?,
            is_bookmarked: reader.flag("isBookmarked")?,
            ended: reader.flag("isEnded")?,
        })
    }
}

impl Recordable for Todo {
    const RECORD_TYPE: EntityKind = EntityKind::Todo;

    fn record_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        put(&mut fields, "project", self.project);
        put(&mut fields, "title", &self.title);
        put(&mut fields, "isCompleted", self.is_completed);
        put(&mut fields, "completedAt", self.completed_at);
        put(&mut fields, "isDeleted", self.is_deleted);
        put(&mut fields, "order", self.order);
        put(&mut fields, "dailyList", self.daily_list);
        put(&mut fields, "assignedDailyList", self.assigned_daily_list);
        put(&mut fields, "createdAt", self.created_at);
        fields
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        let reader = FieldReader::open(record, Self::RECORD_TYPE)?;
        Ok(Self {
            id: record_name::<TodoId>(record, Self::RECORD_TYPE)?,
            project: reader.optional::<ProjectId>("project")?,
            title: reader.optional("title")?.unwrap_or_default(),
            is_completed: reader.flag("isCompleted")?,
            completed_at: reader.optional::<DateTime<Local>>("completedAt")?,
            is_deleted: reader.flag("isDeleted")?,
            order: reader.optional("order")?.unwrap_or(0),
            daily_list: reader.optional::<NaiveDate>("dailyList")?,
            assigned_daily_list: reader.optional::<NaiveDate>("assignedDailyList")?,
            created_at: reader.required::<DateTime<Local>>("createdAt")?,
        })
    }
}
