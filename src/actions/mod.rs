pub mod clock;
pub mod context;
pub mod issue_create;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{ActionContext, OutputSink, RecordedOutputs};
pub use issue_create::{IssueCreateAction, IssueCreateRequest, IssueType};
