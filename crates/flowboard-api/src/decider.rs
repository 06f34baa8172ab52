// ── Outcome deciders ──
//
// The simulator asks a decider for a verdict once per call, after the
// latency window has elapsed. Random failure injection is just one
// implementation; tests plug in deterministic ones.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Operation;

/// How a single remote call resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Succeed,
    /// Injected failure (`Error::Simulated`).
    Fail,
    /// Backend fault (`Error::MalformedResponse`).
    Malformed,
}

/// Strategy deciding the outcome of each remote call.
pub trait OutcomeDecider: Send + Sync + fmt::Debug {
    fn decide(&self, operation: Operation) -> Verdict;
}

// ── Random failures ─────────────────────────────────────────────────

/// Independent Bernoulli draw per call.
pub struct RandomFailures {
    rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomFailures {
    /// `rate` must already be validated to lie in `[0, 1]`.
    pub fn new(rate: f64, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            rate,
            rng: Mutex::new(rng),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl fmt::Debug for RandomFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomFailures")
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

impl OutcomeDecider for RandomFailures {
    fn decide(&self, _operation: Operation) -> Verdict {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.gen_bool(self.rate) {
            Verdict::Fail
        } else {
            Verdict::Succeed
        }
    }
}

// ── Constant deciders ───────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSucceed;

impl OutcomeDecider for AlwaysSucceed {
    fn decide(&self, _operation: Operation) -> Verdict {
        Verdict::Succeed
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysFail;

impl OutcomeDecider for AlwaysFail {
    fn decide(&self, _operation: Operation) -> Verdict {
        Verdict::Fail
    }
}

// ── Scripted ────────────────────────────────────────────────────────

/// Replays queued verdicts, succeeding once a queue runs dry.
///
/// Verdicts queued for a specific operation win over the shared queue.
/// Verdicts may be pushed while calls are already in flight: the decision
/// is taken when the latency window ends, not when the call is issued.
#[derive(Debug, Default)]
pub struct Scripted {
    queues: Mutex<ScriptQueues>,
}

#[derive(Debug, Default)]
struct ScriptQueues {
    shared: VecDeque<Verdict>,
    per_operation: HashMap<Operation, VecDeque<Verdict>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn then(self, verdict: Verdict) -> Self {
        self.push(verdict);
        self
    }

    /// Builder form of [`push_for`](Self::push_for).
    pub fn then_for(self, operation: Operation, verdict: Verdict) -> Self {
        self.push_for(operation, verdict);
        self
    }

    pub fn push(&self, verdict: Verdict) {
        self.lock().shared.push_back(verdict);
    }

    pub fn push_for(&self, operation: Operation, verdict: Verdict) {
        self.lock()
            .per_operation
            .entry(operation)
            .or_default()
            .push_back(verdict);
    }

    /// Number of verdicts not yet consumed.
    pub fn pending(&self) -> usize {
        let queues = self.lock();
        queues.shared.len() + queues.per_operation.values().map(VecDeque::len).sum::<usize>()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptQueues> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutcomeDecider for Scripted {
    fn decide(&self, operation: Operation) -> Verdict {
        let mut queues = self.lock();
        if let Some(verdict) = queues
            .per_operation
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return verdict;
        }
        queues.shared.pop_front().unwrap_or(Verdict::Succeed)
    }
}
