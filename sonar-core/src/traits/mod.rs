//! Trait seams between the orchestration core and its collaborators.

pub mod providers;

pub use providers::{
    ChatRole, ChatTurn, FastProvider, FastReply, InsightReply, IntelProvider, IntelReply,
    ReasoningProvider, ReasoningReply, TokenUsage, WebProvider, WebReply,
};
