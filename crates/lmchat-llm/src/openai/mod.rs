mod client;

pub use client::{OpenAIClient, EMPTY_CONTENT_PLACEHOLDER};
