// flowboard-api: simulated unreliable backend for the flowboard item store
//
// The simulator is a pure latency + failure injector. It keeps no copy of
// the items it is told about; every call sleeps for the configured latency,
// asks an `OutcomeDecider` for a verdict, and resolves accordingly.

pub mod decider;
pub mod error;
pub mod simulator;
pub mod types;

pub use decider::{AlwaysFail, AlwaysSucceed, OutcomeDecider, RandomFailures, Scripted, Verdict};
pub use error::Error;
pub use simulator::{RemoteSimulator, SimulatorConfig};
pub use types::{Ack, NewItem, Operation, RemoteItem};
