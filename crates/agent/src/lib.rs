//! The conversation engine: the heart of AlterEgo.
//!
//! Each turn runs a small state machine:
//!
//! 1. **Start**: system prompt (persona + profile) + history + user message
//! 2. **ModelCall**: send the transcript and the tool catalogue to the model
//! 3. **ToolPhase**: if the model asked for tools, run them and append the
//!    results, then go back to 2
//! 4. **Done**: return the model's text
//!
//! The loop is bounded by `max_iterations` model calls per turn. A model
//! failure ends the turn with a fixed apology instead of an error.

pub mod build;
pub mod engine;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use build::{Runtime, build_runtime};
pub use engine::{
    APOLOGY_REPLY, ConversationEngine, ITERATION_LIMIT_REPLY, TurnOutcome, TurnState, TurnStatus,
};
