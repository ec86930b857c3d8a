//! Interactive questions.
//!
//! The prompts read one line from any [`BufRead`] and write the question
//! to any [`Write`], so the binary can use the terminal while tests feed
//! canned answers.

use std::io::{BufRead, Write};

use crate::configuration::CompressionLevel;
use crate::error::VidshotError;

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String, VidshotError> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_ascii_lowercase())
}

/// Ask a y/N question. Only `y` (any case, surrounding space ignored)
/// counts as yes; an empty line or end of input is no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool, VidshotError> {
    Ok(ask(input, output, question)? == "y")
}

/// Ask before a large batch. Anything but `y` aborts with
/// [`VidshotError::Aborted`].
pub fn confirm_large_batch<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    count: usize,
) -> Result<(), VidshotError> {
    let question = format!("Warning: {count} screenshots is a lot. Continue? (y/N): ");
    if confirm(input, output, &question)? {
        Ok(())
    } else {
        Err(VidshotError::Aborted)
    }
}

/// Ask for a compression level and validate it.
pub fn ask_compression_level<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<CompressionLevel, VidshotError> {
    ask(input, output, "Compression level (1-6): ")?.parse()
}
