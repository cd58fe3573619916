use std::io::Write;

use hlsrip_engine::{Rendition, TrackKind, select};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::AppError;

/// Prints a prompt and reads one trimmed line from stdin.
pub async fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    reader.read_line(&mut line).await?;
    Ok(line.trim().to_owned())
}

/// Shows the numbered rendition menu and keeps asking until the answer is a
/// valid 1-based ordinal.
pub async fn choose_rendition<'a>(
    renditions: &'a [Rendition],
    kind: TrackKind,
) -> Result<&'a Rendition, AppError> {
    println!();
    println!("Available {kind} renditions:");
    for (position, rendition) in renditions.iter().enumerate() {
        println!("  {}. {}", position + 1, rendition.label);
    }

    loop {
        let answer = read_line(&format!(
            "Select a {kind} rendition [1-{}]: ",
            renditions.len()
        ))
        .await?;
        let Ok(ordinal) = answer.parse::<usize>() else {
            println!("Please enter a number between 1 and {}.", renditions.len());
            continue;
        };
        match select(renditions, ordinal) {
            Ok(rendition) => return Ok(rendition),
            Err(e) => println!("{e}. Try again."),
        }
    }
}
