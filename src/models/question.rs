use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the four labelled options of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(Error::Validation(format!(
                "Option '{}' is not one of A, B, C, D",
                other
            ))),
        }
    }
}

/// A single version of a question. Content fields are never rewritten once
/// stored; only the lifecycle fields change when a successor is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub event_id: i64,
    pub body: String,
    pub options: QuestionOptions,
    pub correct_option: OptionLabel,
    pub pool_group: i16,
    pub category: String,
    pub version: i32,
    pub base_lineage_id: i64,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub deprecated_at: Option<DateTime<Utc>>,
    pub superseded_by: Option<i64>,
    pub change_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn is_root(&self) -> bool {
        self.base_lineage_id == self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

/// Content of a question as supplied by an administrator, before it is
/// placed in a lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionContent {
    pub body: String,
    pub options: QuestionOptions,
    pub correct_option: OptionLabel,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub event_id: i64,
    pub pool_group: i16,
    pub content: QuestionContent,
}

/// What participants see: no correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub body: String,
    pub options: QuestionOptions,
    pub pool_group: i16,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            body: q.body.clone(),
            options: q.options.clone(),
            pool_group: q.pool_group,
        }
    }
}

/// Flat row shape of the `questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub event_id: i64,
    pub body: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
    pub pool_group: i16,
    pub category: String,
    pub version: i32,
    pub base_lineage_id: i64,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub deprecated_at: Option<DateTime<Utc>>,
    pub superseded_by: Option<i64>,
    pub change_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = Error;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let correct_option = row.correct_option.parse().map_err(|_| {
            Error::Internal(format!(
                "Question {} has corrupt correct option '{}'",
                row.id, row.correct_option
            ))
        })?;
        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            body: row.body,
            options: QuestionOptions {
                a: row.option_a,
                b: row.option_b,
                c: row.option_c,
                d: row.option_d,
            },
            correct_option,
            pool_group: row.pool_group,
            category: row.category,
            version: row.version,
            base_lineage_id: row.base_lineage_id,
            is_active: row.is_active,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            deprecated_at: row.deprecated_at,
            superseded_by: row.superseded_by,
            change_reason: row.change_reason,
            created_at: row.created_at,
        })
    }
}
