use wiibundle::args::tokenize;

#[test]
fn splits_on_spaces() {
    assert_eq!(tokenize("a b c"), vec!["a", "b", "c"]);
}

#[test]
fn double_quotes_group_words() {
    assert_eq!(tokenize("\"a b\" c"), vec!["a b", "c"]);
}

#[test]
fn backslash_escapes_separator() {
    assert_eq!(tokenize("a\\ b"), vec!["a b"]);
}

#[test]
fn backslash_before_ordinary_character_is_kept() {
    assert_eq!(tokenize("a\\tb"), vec!["a\\tb"]);
    assert_eq!(tokenize("C:\\games\\pong"), vec!["C:\\games\\pong"]);
}

#[test]
fn double_backslash_collapses() {
    assert_eq!(tokenize("a\\\\b"), vec!["a\\b"]);
}

#[test]
fn escaped_quotes_are_literal() {
    assert_eq!(tokenize("say \\\"hi\\\""), vec!["say", "\"hi\""]);
    assert_eq!(tokenize("it\\'s"), vec!["it's"]);
}

#[test]
fn adjacent_quoted_regions_join() {
    assert_eq!(tokenize("'it''s'"), vec!["its"]);
    assert_eq!(tokenize("'it' 's'"), vec!["it", "s"]);
}

#[test]
fn other_quote_kind_is_literal_inside_quotes() {
    assert_eq!(tokenize("\"it's\""), vec!["it's"]);
    assert_eq!(tokenize("'say \"hi\"'"), vec!["say \"hi\""]);
}

#[test]
fn unterminated_quote_runs_to_end() {
    assert_eq!(tokenize("\"abc"), vec!["abc"]);
    assert_eq!(tokenize("x 'a b"), vec!["x", "a b"]);
}

#[test]
fn empty_and_blank_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   ").is_empty());
    assert!(tokenize("\"\"").is_empty());
}

#[test]
fn level_arguments() {
    assert_eq!(
        tokenize("--level 1 \"start here\""),
        vec!["--level", "1", "start here"]
    );
}
