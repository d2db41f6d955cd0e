//! Runtime-feature configuration.

/// Small configuration record read by the façade and the lifecycle's
/// `on_leave` exit hook. There is no persistent state beyond this — the
/// engine is in-memory only.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// When `true`, a synchronous `OUT_OF_REGION` result is reported as
    /// `Complete` rather than as its own distinct status.
    pub treat_out_of_region_as_complete: bool,
    /// When `true`, the façade does not inline-drain the FIFO on exit —
    /// a dedicated worker thread (or interrupt) is assumed to drive
    /// [`crate::facade::Engine::pump`]. When `false`, every façade call
    /// drains the FIFO before returning.
    pub has_dedicated_thread_for_2d_task: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            treat_out_of_region_as_complete: false,
            has_dedicated_thread_for_2d_task: false,
        }
    }
}
