//! Heuristic syntactic repair of JSON-like LLM output.
//!
//! Every function here is pure and never fails. Repair only improves the
//! odds that a subsequent `serde_json` parse succeeds; it does not promise
//! valid output. Text that needs no repair comes back unchanged.

const BOM: char = '\u{FEFF}';

/// Repairs the common ways an LLM breaks JSON.
///
/// # Steps
/// 1. Strip a leading byte-order mark
/// 2. Escape double quotes embedded inside string values
/// 3. Drop trailing commas before `}` or `]`
/// 4. Close a string left unterminated right before a closing brace/bracket
pub fn repair(text: &str) -> String {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let escaped = escape_inner_quotes(text);
    let without_commas = remove_trailing_commas(&escaped);
    close_unterminated_string(without_commas)
}

/// Escapes quotes that appear inside a string value.
///
/// Works line by line, since a valid JSON string never spans lines. While
/// inside a string, a quote only closes it when the next significant
/// character is a structural one (`,` `:` `}` `]`) or the line ends;
/// any other quote gets a backslash.
fn escape_inner_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for line in text.split_inclusive('\n') {
        escape_line(line, &mut out);
    }
    out
}

fn escape_line(line: &str, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string && c == '\\' {
            out.push(c);
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if c == '"' {
            if !in_string {
                in_string = true;
                out.push(c);
            } else if closes_string(&chars[i + 1..]) {
                in_string = false;
                out.push(c);
            } else {
                out.push('\\');
                out.push('"');
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
}

fn closes_string(rest: &[char]) -> bool {
    match next_significant(rest) {
        None => true,
        Some(c) => matches!(c, ',' | ':' | '}' | ']'),
    }
}

fn next_significant(rest: &[char]) -> Option<char> {
    rest.iter().copied().find(|c| !c.is_whitespace())
}

/// Removes commas that directly precede a closing `}` or `]`.
///
/// String contents are left alone.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if matches!(next_significant(&chars[i + 1..]), Some('}') | Some(']')) => {}
            _ => out.push(c),
        }
    }

    out
}

/// Byte offsets of every quote not preceded by an escaping backslash.
fn unescaped_quote_positions(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => positions.push(idx),
            _ => {}
        }
    }

    positions
}

/// Inserts a closing quote when the quote count is odd and the text after
/// the last quote runs into a closing brace or bracket.
fn close_unterminated_string(text: String) -> String {
    let quotes = unescaped_quote_positions(&text);
    if quotes.len() % 2 == 0 {
        return text;
    }

    let Some(&last) = quotes.last() else {
        return text;
    };
    let tail_start = last + 1;
    let tail = &text[tail_start..];

    let Some(bracket) = tail.find(['}', ']']) else {
        return text;
    };

    // Close right after the string content, not after trailing whitespace.
    let content_end = tail[..bracket].trim_end().len();
    let insert_at = tail_start + content_end;

    let mut repaired = String::with_capacity(text.len() + 1);
    repaired.push_str(&text[..insert_at]);
    repaired.push('"');
    repaired.push_str(&text[insert_at..]);
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parses(text: &str) -> Value {
        serde_json::from_str(text).unwrap_or_else(|e| panic!("not valid JSON ({e}): {text}"))
    }

    mod valid_input {
        use super::*;

        #[test]
        fn leaves_valid_json_untouched() {
            let samples = [
                r#"{"a": 1, "b": [1, 2, 3]}"#,
                r#"{"quote": "He said \"hi\" and left", "n": null}"#,
                r#"{"text": "commas, inside }, strings ]"}"#,
                "{\n  \"themes\": [\n    {\"name\": \"Trust\"}\n  ]\n}",
                r#"["a", "b\\", "c"]"#,
                r#""just a string""#,
            ];
            for sample in samples {
                assert_eq!(repair(sample), sample);
            }
        }

        #[test]
        fn returns_plain_text_unchanged() {
            assert_eq!(repair("no json here"), "no json here");
            assert_eq!(repair(""), "");
        }
    }

    mod bom {
        use super::*;

        #[test]
        fn strips_leading_bom() {
            let repaired = repair("\u{FEFF}{\"a\": 1}");
            assert_eq!(repaired, "{\"a\": 1}");
        }
    }

    mod inner_quotes {
        use super::*;

        #[test]
        fn escapes_unescaped_quotes_in_values() {
            let broken = r#"{"quote": "She called it "a game changer" for us"}"#;
            let value = parses(&repair(broken));
            assert_eq!(value["quote"], "She called it \"a game changer\" for us");
        }

        #[test]
        fn handles_multiple_lines_independently() {
            let broken = "{\n  \"a\": \"say \"yes\" now\",\n  \"b\": \"plain\"\n}";
            let value = parses(&repair(broken));
            assert_eq!(value["a"], "say \"yes\" now");
            assert_eq!(value["b"], "plain");
        }
    }

    mod trailing_commas {
        use super::*;

        #[test]
        fn removes_before_closing_brace_and_bracket() {
            let broken = "{\"items\": [1, 2, 3,], \"x\": {\"y\": 1,},}";
            let value = parses(&repair(broken));
            assert_eq!(value["items"].as_array().unwrap().len(), 3);
            assert_eq!(value["x"]["y"], 1);
        }

        #[test]
        fn removes_across_newlines() {
            let broken = "[\n  \"a\",\n  \"b\",\n]";
            let value = parses(&repair(broken));
            assert_eq!(value.as_array().unwrap().len(), 2);
        }
    }

    mod unterminated {
        use super::*;

        #[test]
        fn closes_string_before_brace() {
            let value = parses(&repair(r#"{"summary": "cut off}"#));
            assert_eq!(value["summary"], "cut off");
        }

        #[test]
        fn closes_string_before_trailing_whitespace() {
            let value = parses(&repair("{\"summary\": \"cut off\n}"));
            assert_eq!(value["summary"], "cut off");
        }

        #[test]
        fn leaves_text_without_closing_bracket() {
            let broken = r#"{"summary": "cut off"#;
            assert_eq!(repair(broken), broken);
        }
    }
}
