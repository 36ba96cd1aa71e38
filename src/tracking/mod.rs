mod poller;
mod status;

pub use poller::{PollOutcome, PollSession, StatusPoller, CONNECTION_LOST, DEFAULT_QUERY_TIMEOUT};
pub use status::{StatusResponse, WorkStatus};
