//! Line tokenizer

/// Split one line into whitespace-delimited tokens.
///
/// Everything from the first `#` onward is a comment and is discarded.
/// An empty or comment-only line yields no tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    let code = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    code.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("   \t ", &[])]
    #[case("# just a comment", &[])]
    #[case("   # indented comment", &[])]
    #[case("option routers 10.0.0.1;", &["option", "routers", "10.0.0.1;"])]
    #[case("  option routers   10.0.0.1  # gateway", &["option", "routers", "10.0.0.1"])]
    #[case("host a{#x", &["host", "a{"])]
    #[case("subnet 10.0.0.0 netmask 255.255.255.0 {", &["subnet", "10.0.0.0", "netmask", "255.255.255.0", "{"])]
    fn tokenizes(#[case] line: &str, #[case] expected: &[&str]) {
        assert_eq!(tokenize(line), expected);
    }

    #[test]
    fn quoted_hash_still_starts_a_comment() {
        assert_eq!(
            tokenize("option domain-name \"a#b\";"),
            vec!["option", "domain-name", "\"a"]
        );
    }
}
