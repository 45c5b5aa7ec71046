//! Single-line CSV tokenizer.

/// Ordered fields of one CSV line, in file order.
pub type RawRow = Vec<String>;

/// Parses a CSV line into trimmed fields.
///
/// A `"` toggles quoted mode and is dropped from the output, so a comma
/// between quotes stays inside its field. There is no escape for a literal
/// quote: `""` simply toggles twice. Each line is parsed on its own; an
/// unbalanced quote swallows the rest of that line only.
///
/// The result always has one more field than there are unquoted commas.
pub fn parse_csv_line(line: &str) -> RawRow {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    // Last field, even when empty
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_line_simple() {
        let result = parse_csv_line("a,b,c");
        assert_eq!(result, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted_comma() {
        let result = parse_csv_line("a,\"b,c\",d");
        assert_eq!(result, vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_parse_csv_line_quotes_are_stripped() {
        let result = parse_csv_line("\"he said \"\"hi\"\"\",b");
        assert_eq!(result, vec!["he said hi", "b"]);
    }

    #[test]
    fn test_parse_csv_line_trimmed() {
        let result = parse_csv_line("  a  ,  b  ");
        assert_eq!(result, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_csv_line_trailing_empty_field() {
        assert_eq!(parse_csv_line("a,b,"), vec!["a", "b", ""]);
        assert_eq!(parse_csv_line(""), vec![""]);
    }

    #[test]
    fn test_parse_csv_line_unbalanced_quote_absorbs_rest() {
        let result = parse_csv_line("a,\"b,c,d");
        assert_eq!(result, vec!["a", "b,c,d"]);
    }

    #[test]
    fn test_parse_csv_line_carriage_return() {
        assert_eq!(parse_csv_line("x,y\r"), vec!["x", "y"]);
    }
}
