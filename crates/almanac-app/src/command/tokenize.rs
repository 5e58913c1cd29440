/// ## Summary
/// Splits a command line on whitespace, keeping `"double quoted"` spans as
/// single tokens.
///
/// A quote may open mid-word (`a"b c"` is one token, `ab c`). Empty quoted
/// spans produce no token, and an unterminated quote runs to the end of the
/// line.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            if !in_quotes && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            tokenize("  use calendar\t--name  Work "),
            vec!["use", "calendar", "--name", "Work"]
        );
    }

    #[test]
    fn keeps_quoted_spans() {
        assert_eq!(
            tokenize(r#"create event "Team sync" on 2025-03-13"#),
            vec!["create", "event", "Team sync", "on", "2025-03-13"]
        );
    }

    #[test]
    fn quote_opening_mid_word_joins() {
        assert_eq!(tokenize(r#"a"b c" d"#), vec!["ab c", "d"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(tokenize(r#"x "open ended"#), vec!["x", "open ended"]);
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize(r#""""#).is_empty());
    }
}
