// Public modules
pub mod chat;
pub mod conversation;
pub mod error;
pub mod logger;
pub mod platform;
pub mod sanitize;
pub mod session;
pub mod transport;
pub mod usage;

mod observability;

// Re-exports
pub use conversation::{Conversation, ConversationState};
pub use error::{Error, Result};
pub use logger::TransportLogger;
pub use observability::register_biometrics;
pub use platform::{EnvProbe, FixedProbe, Platform, PlatformProbe};
pub use session::{ActiveThread, Exchange, SessionStore, Thread, ThreadId};
pub use transport::{
    AccountUsage, ChatReply, ChatRequest, HttpClient, HttpRequest, HttpResponse, Method, Origins,
    ReqwestHttp, Transport, TransportSelector,
};
pub use usage::{UsageState, UsageTracker};
