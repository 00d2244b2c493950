//! Chat response lines
//!
//! Every line the server writes to a client.

pub const NAME_PROMPT: &str = "Enter your name: ";
pub const NO_NICKNAME: &str = "No nickname provided.";
pub const SERVER_SHUTTING_DOWN: &str = "Server is shutting down...";

pub fn joined(name: &str) -> String {
    format!("{} Joined the chat!", name)
}

pub fn chat(name: &str, message: &str) -> String {
    format!("{}: {}", name, message)
}

pub fn nick_changed(old: &str, new: &str) -> String {
    format!("{} changed their name to {}", old, new)
}

/// Private confirmation sent only to the renamed client
pub fn nick_confirmed(new: &str) -> String {
    format!("Your name has been changed to {}", new)
}

pub fn left(name: &str) -> String {
    format!("{} has left the chat.", name)
}
