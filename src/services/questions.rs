//! Arithmetic question generation and per-session challenges.
//!
//! Each session holds at most one challenge: generating a question replaces the
//! previous one for that session, and answers are only ever checked against the
//! caller's own challenge.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::external::FactSource;
use crate::auth::session::SESSION_TTL_SECS;
use crate::models::{Operator, Question, VerifyResponse};

/// Difficulty label attached to every question.
pub const LEVEL: &str = "medium";

/// Held challenges are swept once the map grows past this size.
const SWEEP_THRESHOLD: usize = 1024;

/// Minimum time between two sweeps, in milliseconds.
const SWEEP_INTERVAL_MS: i64 = 60_000;

/// Roll operands and an operator.
///
/// Both operands are two-digit; a multiplication re-rolls the right operand
/// into 2..=10.
pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> (i32, Operator, i32) {
    let left = rng.gen_range(10..=99);
    let operator = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
    let right = match operator {
        Operator::Multiply => rng.gen_range(2..=10),
        _ => rng.gen_range(10..=99),
    };
    (left, operator, right)
}

impl Question {
    /// Build a question from its parts; the answer is derived, never supplied.
    pub fn from_parts(id: u32, left: i32, operator: Operator, right: i32, timestamp: i64) -> Self {
        Self {
            id,
            question: format!("{} {} {}", left, operator.symbol(), right),
            left,
            right,
            operator,
            answer: operator.apply(left, right),
            level: LEVEL.to_string(),
            fact: String::new(),
            timestamp,
        }
    }
}

#[derive(Default)]
struct Challenges {
    held: HashMap<String, Question>,
    last_sweep_ms: i64,
}

impl Challenges {
    /// Drop challenges older than a session, at most once per interval.
    fn sweep(&mut self, now_ms: i64) {
        if self.held.len() < SWEEP_THRESHOLD || now_ms - self.last_sweep_ms < SWEEP_INTERVAL_MS {
            return;
        }
        let cutoff = now_ms - SESSION_TTL_SECS * 1000;
        let before = self.held.len();
        self.held.retain(|_, q| q.timestamp >= cutoff);
        self.last_sweep_ms = now_ms;
        debug!(removed = before - self.held.len(), "swept expired challenges");
    }
}

/// Generates questions and keeps the challenge each session must answer.
pub struct QuestionService {
    facts: Arc<dyn FactSource>,
    challenges: RwLock<Challenges>,
}

impl QuestionService {
    pub fn new(facts: Arc<dyn FactSource>) -> Self {
        Self {
            facts,
            challenges: RwLock::new(Challenges::default()),
        }
    }

    /// Produce a fresh question, with a fact about one operand when available.
    pub async fn generate(&self) -> Question {
        let (mut question, fact_target) = {
            let mut rng = rand::thread_rng();
            let (left, operator, right) = roll(&mut rng);
            let id = rng.gen_range(1..=u32::MAX);
            let target = if rng.gen_bool(0.5) { left } else { right };
            let now = chrono::Utc::now().timestamp_millis();
            (Question::from_parts(id, left, operator, right, now), target)
        };

        question.fact = self.fact_or_empty(fact_target).await;
        question
    }

    /// Generate a question and hold it as the session's challenge.
    pub async fn issue(&self, session_id: &str) -> Question {
        let question = self.generate().await;

        let mut challenges = self.challenges.write().await;
        challenges.sweep(chrono::Utc::now().timestamp_millis());
        challenges
            .held
            .insert(session_id.to_string(), question.clone());

        question
    }

    /// Check an answer against the session's challenge.
    ///
    /// A missing challenge, a different question id or a missing answer all
    /// count as wrong. The challenge stays held until replaced or forgotten.
    pub async fn verify(
        &self,
        session_id: &str,
        question_id: Option<u32>,
        answer: Option<i32>,
    ) -> VerifyResponse {
        let expected = {
            let challenges = self.challenges.read().await;
            challenges
                .held
                .get(session_id)
                .filter(|q| question_id.is_none_or(|id| id == q.id))
                .map(|q| q.answer)
        };

        let correct = matches!((expected, answer), (Some(e), Some(a)) if e == a);
        if !correct {
            debug!(?question_id, held = expected.is_some(), "answer rejected");
            return VerifyResponse {
                correct,
                fact: String::new(),
            };
        }

        let fact = match expected {
            Some(value) => self.fact_or_empty(value).await,
            None => String::new(),
        };
        VerifyResponse { correct, fact }
    }

    /// The challenge currently held for a session.
    pub async fn held(&self, session_id: &str) -> Option<Question> {
        self.challenges.read().await.held.get(session_id).cloned()
    }

    /// Drop a session's challenge.
    pub async fn forget(&self, session_id: &str) {
        self.challenges.write().await.held.remove(session_id);
    }

    async fn fact_or_empty(&self, number: i32) -> String {
        match self.facts.fact_about(number).await {
            Ok(fact) => fact,
            Err(e) => {
                debug!(number, "no fact available: {}", e);
                String::new()
            }
        }
    }
}
