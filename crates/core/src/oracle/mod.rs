//! Move suggestions from a language model
//!
//! The model is an unreliable oracle: whatever it says is only a candidate
//! that the rules engine validates before anything is played.

mod client;
mod prompt;
mod types;

pub use client::OracleClient;
pub use prompt::build_prompt;
pub use types::*;

/// Pulls the move out of a free-text reply: the first whitespace-separated
/// token with trailing `.` and `,` removed.
pub fn extract_move_token(reply: &str) -> Option<String> {
    let token = reply.split_whitespace().next()?;
    let token = token.trim_end_matches(['.', ',']);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_move_token() {
        assert_eq!(extract_move_token("h2e2").as_deref(), Some("h2e2"));
        assert_eq!(extract_move_token("  h2e2.\n").as_deref(), Some("h2e2"));
        assert_eq!(extract_move_token("Nf3, developing the knight").as_deref(), Some("Nf3"));
        assert_eq!(extract_move_token("e4.,").as_deref(), Some("e4"));
        assert_eq!(extract_move_token(""), None);
        assert_eq!(extract_move_token("   \n"), None);
        assert_eq!(extract_move_token("..."), None);
    }
}
