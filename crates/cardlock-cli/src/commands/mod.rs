//! Subcommand implementations.

pub mod card;
pub mod credentials;
pub mod lcd_demo;
pub mod run;
pub mod servo;

/// Replies that end an interactive loop.
pub fn is_quit(reply: &str) -> bool {
    matches!(
        reply.trim().to_ascii_lowercase().as_str(),
        "quit" | "q" | "exit"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("quit", true)]
    #[case(" Q ", true)]
    #[case("EXIT", true)]
    #[case("quite", false)]
    #[case("", false)]
    fn test_is_quit(#[case] reply: &str, #[case] expected: bool) {
        assert_eq!(is_quit(reply), expected);
    }
}
