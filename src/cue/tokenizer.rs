use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("mismatched quotes")]
    MismatchedQuotes,

    #[error("command cannot be quoted")]
    QuotedCommand,
}

/// Splits a trimmed line into whitespace separated tokens.
///
/// Double quotes group an argument containing spaces and are not part of the token.
/// The first token is the command and may not be quoted.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    if line.starts_with('"') {
        return Err(TokenizeError::QuotedCommand);
    }

    for c in line.chars() {
        match c {
            '"' => in_quote = !in_quote,
            ' ' | '\t' if !in_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if in_quote {
        return Err(TokenizeError::MismatchedQuotes);
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
