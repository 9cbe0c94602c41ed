use proptest::prelude::*;
use pxe_dhcpconf::{BlockType, ConfigDocument, tokenize};

fn kind() -> impl Strategy<Value = BlockType> {
    prop::sample::select(BlockType::ALL.to_vec())
}

fn padding() -> impl Strategy<Value = String> {
    "[ \t]{0,3}"
}

/// A free-text line with irregular spacing and an optional trailing comment.
fn text_line() -> impl Strategy<Value = String> {
    (
        padding(),
        prop::collection::vec("[a-z0-9.;:\"-]{1,8}", 1..4),
        padding(),
        prop::option::of("#[ a-z{}]{0,8}"),
    )
        .prop_map(|(lead, words, gap, comment)| {
            format!(
                "{lead}option{gap} {}{}",
                words.join(&format!(" {gap}")),
                comment.unwrap_or_default()
            )
        })
}

fn block() -> impl Strategy<Value = String> {
    let leaf = (
        kind(),
        prop::option::of("[a-z][a-z0-9]{0,6}"),
        prop::collection::vec(text_line(), 0..3),
    )
        .prop_map(|(k, n, lines)| assemble(k, n, lines, Vec::new()));

    leaf.prop_recursive(3, 24, 3, |inner| {
        (
            kind(),
            prop::option::of("[a-z][a-z0-9]{0,6}"),
            prop::collection::vec(text_line(), 0..3),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(k, n, lines, children)| assemble(k, n, lines, children))
    })
}

fn assemble(
    kind: BlockType,
    name: Option<String>,
    lines: Vec<String>,
    children: Vec<String>,
) -> String {
    let mut out = match name {
        Some(name) => format!("{}   {} {{  # open\n", kind.keyword(), name),
        None => format!("{} {{\n", kind.keyword()),
    };
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    for child in children {
        out.push_str(&child);
    }
    out.push_str("  }\n\n");
    out
}

fn document() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(text_line(), 0..3),
        prop::collection::vec(block(), 0..4),
    )
        .prop_map(|(lines, blocks)| {
            let mut out = String::new();
            for line in lines {
                out.push_str(&line);
                out.push('\n');
            }
            for block in blocks {
                out.push_str(&block);
            }
            out
        })
}

proptest! {
    #[test]
    fn tokens_hold_no_whitespace_or_comment(line in "\\PC*") {
        for token in tokenize(&line) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.contains(char::is_whitespace));
            prop_assert!(!token.contains('#'));
        }
    }

    #[test]
    fn reparse_of_rendered_text_keeps_tree(text in document()) {
        let parsed = ConfigDocument::from_text(&text).unwrap();
        let reparsed = ConfigDocument::from_text(&parsed.render()).unwrap();
        prop_assert!(parsed.root().same_structure(reparsed.root()));
    }

    #[test]
    fn render_is_a_fixed_point(text in document()) {
        let once = ConfigDocument::from_text(&text).unwrap().render();
        let twice = ConfigDocument::from_text(&once).unwrap().render();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn free_text_lines_are_normalized(text in document()) {
        let parsed = ConfigDocument::from_text(&text).unwrap();
        for line in parsed.root().lines() {
            prop_assert_eq!(line.trim(), line.as_str());
            prop_assert!(!line.contains("  "));
            prop_assert!(!line.contains('#'));
        }
    }
}
