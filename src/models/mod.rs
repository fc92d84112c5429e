pub mod language;
pub mod problem;
pub mod result;

pub use language::Language;
pub use problem::{FileRef, Problem, Solution};
pub use result::{JudgeResult, JudgeStatus, ResultDetails, RunId};
