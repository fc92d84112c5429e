pub mod fetcher;
pub mod session;
pub mod source;
pub mod status_interpreter;
pub mod submitter;

pub use fetcher::{ResultFetcher, ResultSource};
pub use session::{SessionManager, SessionState};
pub use source::{load_source, DirectoryResolver, SourceResolver, MAX_SOURCE_SIZE};
pub use status_interpreter::{interpret, Verdict};
pub use submitter::SubmissionSubmitter;
