//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod log_entry;
pub mod malformed_entry;
pub mod message;
pub mod operation;
pub mod reconstruction;
pub mod stats;

// Re-export for convenience
pub use error::{AppError, InputError, ParseError};
pub use identifiers::{
    EntryUuid, InvalidSessionId, InvalidToolUseId, InvalidUuid, SessionId, ToolUseId,
};
pub use log_entry::{EntryMetadata, EntryType, LogEntry, Origin};
pub use malformed_entry::MalformedEntry;
pub use message::{ContentBlock, ToolCall, ToolName, ToolResult};
pub use operation::{
    BashOp, EditOp, EditSpec, IncompleteOp, IncompleteReason, MultiEditOp, Operation,
    OperationKind, OtherOp, ReadOp, SequencedOperation, ToolOutcome, WriteOp,
};
pub use reconstruction::{
    BaselineKind, BaselineSource, EditFailureReason, FailedEdit, ReconstructionResult,
    ReconstructionStatus, SeenOperation, ShellReference,
};
pub use stats::OperationStats;
