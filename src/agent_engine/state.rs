use std::path::PathBuf;

/// Why the loop stopped without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model replied without tool calls.
    Answered,
    /// Every step in the budget was spent on tool calls.
    StepBudgetExhausted,
}

/// Summary of one completed run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    /// The model's final text, or empty when it gave none.
    pub answer: String,
    /// Model requests made, including the answering one.
    pub steps: u32,
    pub stop: StopReason,
    /// Screenshots written to the dump directory, in order.
    pub screenshots: Vec<PathBuf>,
}
