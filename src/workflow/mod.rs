pub mod poll_loop;
pub mod tracking;

pub use poll_loop::{PollLoop, PollSettings, Registrar, TickStats};
pub use tracking::{submission_channel, ResultSink, SubmissionHandle};
