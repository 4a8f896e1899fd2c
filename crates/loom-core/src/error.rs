use thiserror::Error;

/// Structural violations found while replaying an operation buffer.
///
/// These always point at a bug in the code that wrote the buffer, never at a
/// runtime condition. Replay stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpsError {
    #[error("unknown op kind {kind:#04x} at byte {pc}")]
    UnknownKind { kind: u8, pc: usize },

    #[error("truncated {kind} record at byte {pc}")]
    Truncated { kind: &'static str, pc: usize },

    #[error("macro at byte {pc} was never stopped or ends out of range")]
    BadMacro { pc: usize },

    #[error("call at byte {pc} refers to an invalid range {start}..{end}")]
    BadCall { pc: usize, start: usize, end: usize },

    #[error("macro calls nested deeper than {0}")]
    CallDepth(usize),

    #[error("unbalanced stack: pop of {found} while {expected} is innermost")]
    UnbalancedStack { expected: u32, found: u32 },

    #[error("stack pop of {0} without a matching push")]
    StackUnderflow(u32),

    #[error("{0} stack pushes left open at end of buffer")]
    UnclosedStack(usize),
}
