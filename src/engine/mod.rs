pub mod engine;
pub mod protocol;
pub mod apply_narrative;
pub mod session;
pub mod clock;

pub mod prompt_builder;
pub mod narrative_service;
pub mod llm_client;
pub mod gemini_client;
