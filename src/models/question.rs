//! Arithmetic question models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Arithmetic operator of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    /// Symbol shown to players.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
        }
    }

    pub fn apply(&self, left: i32, right: i32) -> i32 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
        }
    }
}

/// A generated question.
///
/// Operands and answer stay on the server; clients only see the rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Question {
    pub id: u32,
    /// Rendered text, e.g. `15 + 20`
    pub question: String,
    #[serde(skip)]
    pub left: i32,
    #[serde(skip)]
    pub right: i32,
    #[serde(skip)]
    pub operator: Operator,
    #[serde(skip)]
    pub answer: i32,
    pub level: String,
    /// Trivia about one of the operands, empty when unavailable
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fact: String,
    /// Generation time in milliseconds since the epoch
    pub timestamp: i64,
}

/// Answer submission body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Id of the question being answered; when absent the held question is used
    #[serde(default)]
    pub question_id: Option<u32>,
    /// Submitted answer; `null` (e.g. an unparsable input) counts as wrong
    #[serde(default)]
    pub answer: Option<i32>,
    /// Milliseconds the player spent on the question
    #[serde(default)]
    pub time_spent: i64,
}

/// Answer verification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub correct: bool,
    pub fact: String,
}
