use serde::Serialize;

/// Status of a generation run.
///
/// `InProgress` carries the number of records finished so far.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RunStatus {
    InProgress(u32),
    Completed(String),
    Failed(String),
}
