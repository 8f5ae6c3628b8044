use async_trait::async_trait;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::translate::Translation;
use crate::Result;

/// Human checkpoint between translation and publishing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewGate: Send + Sync {
    /// `true` lets the post go out
    async fn approve(&self, translation: &Translation) -> Result<bool>;
}

/// Prompts the operator on the terminal
pub struct StdinReview;

#[async_trait]
impl ReviewGate for StdinReview {
    async fn approve(&self, translation: &Translation) -> Result<bool> {
        println!();
        println!("{}", style("--- HUMAN REVIEW REQUIRED ---").yellow().bold());
        println!("{}", translation.text);
        println!();
        println!("Press Enter to publish, or type 'n' to cancel:");

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

        // closed stdin is not an approval
        if read == 0 {
            tracing::warn!("No reviewer input available");
            return Ok(false);
        }

        Ok(is_approval(&line))
    }
}

fn is_approval(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers() {
        assert!(is_approval("\n"));
        assert!(is_approval("y\n"));
        assert!(is_approval("yes"));
        assert!(!is_approval("n\n"));
        assert!(!is_approval(" NO "));
    }
}
