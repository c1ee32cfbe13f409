use crate::shell::ShellError;

/// Splits a command line into words.
///
/// Whitespace separates words. Single quotes keep their content verbatim,
/// double quotes allow `\"` and `\\` escapes, a backslash outside quotes
/// escapes the next character. Quotes glue onto adjacent text, so `a"b c"`
/// is the single word `ab c`.
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return unterminated(line),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return unterminated(line),
                        },
                        Some(c) => current.push(c),
                        None => return unterminated(line),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn unterminated(line: &str) -> Result<Vec<String>, ShellError> {
    Err(ShellError::UnterminatedQuoteError {
        line: line.to_string(),
    })
}
