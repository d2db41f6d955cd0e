//! The status-code vocabulary shared by the dispatcher, the operation
//! lifecycle and the façade.

use pix2d_hal::{IoError, IoOutcome};

/// Result of a façade call, a pump step, or a stored operation result.
/// Mirrors `arm_fsm_rt_t`/the error-code table: non-error variants are
/// "progress", error variants are terminal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Completed synchronously.
    Cpl,
    /// Queued; completion will arrive via the callback.
    Async,
    /// Transient, internal use only — never surfaced to a caller.
    OnGoing,
    /// Waiting on an external event, internal use only.
    WaitForObj,
    /// Intersection of region and tile was empty — non-fatal.
    OutOfRegion,
    /// Neither hardware nor software supports this op/color-depth.
    NotSupport,
    /// Unrecognized IO type or descriptor.
    InvalidOp,
    /// Hardware backend busy and dispatch policy forbids software fallback.
    IoBusy,
    /// Backend-reported negative error code, passed through verbatim.
    Backend(i32),
}

impl StatusCode {
    /// `true` for the codes the spec marks as negative/terminal errors.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            StatusCode::NotSupport
                | StatusCode::InvalidOp
                | StatusCode::IoBusy
                | StatusCode::Backend(_)
        )
    }

    /// Encode as the signed result-code representation stored on an
    /// operation record. Non-error codes encode as small non-negative
    /// integers; errors as negative ones, `Backend(n)` passed through
    /// as-is (the caller is expected to have supplied a negative `n`).
    pub const fn as_i32(self) -> i32 {
        match self {
            StatusCode::Cpl => 0,
            StatusCode::Async => 1,
            StatusCode::OnGoing => 2,
            StatusCode::WaitForObj => 3,
            StatusCode::OutOfRegion => 4,
            StatusCode::NotSupport => -1,
            StatusCode::InvalidOp => -2,
            StatusCode::IoBusy => -3,
            StatusCode::Backend(n) => n,
        }
    }

    /// Inverse of [`StatusCode::as_i32`]: reconstructs a `StatusCode` from
    /// an operation record's stored result code.
    pub const fn from_result_code(code: i32) -> StatusCode {
        match code {
            0 => StatusCode::Cpl,
            1 => StatusCode::Async,
            2 => StatusCode::OnGoing,
            3 => StatusCode::WaitForObj,
            4 => StatusCode::OutOfRegion,
            -1 => StatusCode::NotSupport,
            -2 => StatusCode::InvalidOp,
            -3 => StatusCode::IoBusy,
            other => StatusCode::Backend(other),
        }
    }
}

impl From<IoOutcome> for StatusCode {
    fn from(value: IoOutcome) -> Self {
        match value {
            IoOutcome::Cpl => StatusCode::Cpl,
            IoOutcome::Async => StatusCode::Async,
            IoOutcome::OnGoing => StatusCode::OnGoing,
            IoOutcome::WaitForObj => StatusCode::WaitForObj,
        }
    }
}

impl From<IoError> for StatusCode {
    fn from(value: IoError) -> Self {
        match value {
            IoError::NotSupport => StatusCode::NotSupport,
            IoError::InvalidOp => StatusCode::InvalidOp,
            IoError::IoBusy => StatusCode::IoBusy,
            IoError::Backend(n) => StatusCode::Backend(n),
        }
    }
}

impl From<Result<IoOutcome, IoError>> for StatusCode {
    fn from(value: Result<IoOutcome, IoError>) -> Self {
        match value {
            Ok(o) => o.into(),
            Err(e) => e.into(),
        }
    }
}
