//! Comment removal ahead of header matching

/// Replace `//` and `/* */` comments with whitespace.
///
/// String literals (`'...'`) and quoted identifiers (`"..."`) are left intact,
/// and line breaks are preserved so line-anchored patterns still apply.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' if quote.is_none() => {
                quote = Some(ch);
                result.push(ch);
            }
            c if quote == Some(c) => {
                // Doubled quote is an escape inside the literal
                if chars.peek() == Some(&c) {
                    result.push(c);
                    if let Some(next) = chars.next() {
                        result.push(next);
                    }
                } else {
                    quote = None;
                    result.push(c);
                }
            }
            '\n' if quote.is_some() => {
                // Unterminated literal ends at the line break
                quote = None;
                result.push(ch);
            }
            '/' if quote.is_none() => match chars.peek() {
                Some('/') => {
                    chars.next();
                    result.push(' ');
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    result.push(' ');
                    let mut prev = '\0';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => result.push(ch),
            },
            _ => result.push(ch),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment() {
        assert_eq!(strip_comments("a // b\nc"), "a  \nc");
    }

    #[test]
    fn test_block_comment_keeps_lines() {
        let out = strip_comments("a /* x\ninclude Foo\n */ b");
        assert_eq!(out.lines().count(), 3);
        assert!(!out.contains("include"));
    }

    #[test]
    fn test_strings_untouched() {
        let cql = "valueset \"VS\": 'http://example.com/ValueSet/1'";
        assert_eq!(strip_comments(cql), cql);
    }
}
