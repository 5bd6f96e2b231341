pub mod error;
pub mod events;
pub mod ingest;
pub mod store;
pub mod types;

pub use error::{FieldIssue, IngestError, StoreError};
pub use events::{Listener, SessionEvent, Subscription};
pub use ingest::{parse_session_payload, parse_session_str};
pub use store::{SessionStore, DEFAULT_EVENT_BUFFER};
pub use types::{Binding, Entry, NewSession, Session, SessionCounts};
