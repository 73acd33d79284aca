pub mod client;
pub mod fanout;
pub mod types;

pub use client::{HttpSummaryBackend, SummaryBackend, SummaryError};
pub use fanout::FanOutAggregator;
pub use types::{
    AssistantReply, ChatMessage, Preamble, Provider, ProviderKind, ProviderSelection, ResultSet,
    Role, SummaryRequest, SummaryResponse, SummaryResult,
};
