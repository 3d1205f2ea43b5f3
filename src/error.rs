use super::processor::BridgePhase;
use thiserror::Error;

/// Misuse of the processor's lifecycle by the driving collector.
///
/// Broken internal invariants are not reported here, they abort.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("bridge candidates can only be registered before the stw step (phase is {0:?})")]
    RegistrationClosed(BridgePhase),

    #[error("{operation} called out of order (phase is {phase:?})")]
    OutOfPhase {
        operation: &'static str,
        phase: BridgePhase,
    },
}
