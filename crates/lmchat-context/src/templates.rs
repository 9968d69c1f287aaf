/// Base instruction sent as the first system message of every turn
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer clearly and concisely, \
and rely on the conversation so far when the user refers to earlier messages.";

/// Heading placed above the numbered rolling-memory lines
pub const MEMORY_RECAP_HEADER: &str = "Recap of earlier exchanges in this conversation:";
