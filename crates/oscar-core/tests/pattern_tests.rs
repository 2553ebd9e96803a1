//! Address pattern matching tests

use oscar_core::{CharClass, Matcher, Pattern};

const CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn p(matchers: Vec<Matcher>) -> Pattern {
    Pattern::from_matchers(matchers)
}

fn c(b: u8) -> Matcher {
    Matcher::Char(b)
}

fn cc(s: &str) -> Matcher {
    Matcher::Class(CharClass::from_bytes(s.as_bytes()))
}

fn not_cc(s: &str) -> Matcher {
    Matcher::Class(CharClass::from_bytes(s.as_bytes()).inverted())
}

/// Deterministic spread of short inputs built from `CHARS`
fn samples() -> Vec<String> {
    let bytes = CHARS.as_bytes();
    (0..20)
        .map(|i| {
            let len = i % 10 + 1;
            (0..len)
                .map(|j| bytes[(i * 7 + j * 13) % bytes.len()] as char)
                .collect::<String>()
        })
        .collect()
}

fn singles() -> Vec<String> {
    CHARS.chars().map(String::from).collect()
}

fn check(pattern: &Pattern, inputs: &[String], want: bool) {
    for input in inputs {
        assert_eq!(
            pattern.matches(input),
            want,
            "pattern {:?} against {:?}",
            pattern.to_string(),
            input
        );
    }
}

fn strs(ss: &[&str]) -> Vec<String> {
    ss.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_empty_pattern() {
    check(&p(vec![]), &strs(&[""]), true);
    check(&p(vec![]), &samples(), false);
}

#[test]
fn test_literal() {
    check(&p(vec![c(b'a')]), &strs(&["a"]), true);
    check(&p(vec![c(b'a')]), &strs(&["aa", "ab", "b", ""]), false);
    check(&p(vec![c(b'a'), c(b'b')]), &strs(&["ab"]), true);
    check(&p(vec![c(b'a'), c(b'b')]), &strs(&["aa", "abc", "a", "b"]), false);
}

#[test]
fn test_single_wildcard() {
    let q = p(vec![Matcher::Single]);
    check(&q, &singles(), true);
    let mut longer: Vec<String> = samples().into_iter().map(|s| s + "end").collect();
    longer.push(String::new());
    check(&q, &longer, false);
}

#[test]
fn test_single_then_literal() {
    let pattern = p(vec![Matcher::Single, c(b'a')]);
    let hits: Vec<String> = CHARS.chars().map(|r| format!("{}a", r)).collect();
    check(&pattern, &hits, true);

    let misses: Vec<String> = samples()
        .into_iter()
        .map(|s| format!("{}b{}", &s[..1], &s[1..]))
        .collect();
    check(&pattern, &misses, false);
}

#[test]
fn test_literal_then_single() {
    let pattern = p(vec![c(b'a'), Matcher::Single]);
    let hits: Vec<String> = CHARS.chars().map(|r| format!("a{}", r)).collect();
    check(&pattern, &hits, true);

    let mut misses: Vec<String> = CHARS.chars().map(|r| format!("b{}", r)).collect();
    misses.extend(strs(&["a", ""]));
    check(&pattern, &misses, false);
}

#[test]
fn test_multi_wildcard() {
    let star = p(vec![Matcher::Multi]);
    let mut inputs = samples();
    inputs.push(String::new());
    check(&star, &inputs, true);
}

#[test]
fn test_literal_then_multi() {
    let pattern = p(vec![c(b'a'), Matcher::Multi]);
    let mut hits: Vec<String> = samples().into_iter().map(|s| format!("a{}", s)).collect();
    hits.push("a".to_string());
    check(&pattern, &hits, true);

    let mut misses: Vec<String> = samples().into_iter().map(|s| format!("b{}", s)).collect();
    misses.push(String::new());
    check(&pattern, &misses, false);
}

#[test]
fn test_multi_then_literal() {
    let pattern = p(vec![Matcher::Multi, c(b'a')]);
    let mut hits: Vec<String> = samples().into_iter().map(|s| format!("{}a", s)).collect();
    hits.push("a".to_string());
    check(&pattern, &hits, true);

    let misses: Vec<String> = samples().into_iter().map(|s| format!("{}b", s)).collect();
    check(&pattern, &misses, false);
    check(&pattern, &strs(&["ax", ""]), false);
}

#[test]
fn test_char_class() {
    check(&p(vec![cc("a")]), &strs(&["a"]), true);
    let not_a: Vec<String> = CHARS.chars().filter(|&r| r != 'a').map(String::from).collect();
    check(&p(vec![cc("a")]), &not_a, false);

    check(&p(vec![cc("abc")]), &strs(&["a", "b", "c"]), true);
    let mut misses: Vec<String> = CHARS
        .chars()
        .filter(|r| !"abc".contains(*r))
        .map(String::from)
        .collect();
    misses.extend(strs(&["ab", "da", ""]));
    check(&p(vec![cc("abc")]), &misses, false);
}

#[test]
fn test_inverted_char_class() {
    let pattern = p(vec![not_cc("abc")]);
    let hits: Vec<String> = CHARS
        .chars()
        .filter(|r| !"abc".contains(*r))
        .map(String::from)
        .collect();
    check(&pattern, &hits, true);

    let mut misses: Vec<String> = samples().into_iter().map(|s| format!("a{}", s)).collect();
    misses.extend(strs(&["", "a", "b", "c"]));
    check(&pattern, &misses, false);
}

#[test]
fn test_parsed_ranges() {
    let range = Pattern::parse("[a-e]").unwrap();
    let inverted = Pattern::parse("[!a-e]").unwrap();
    for b in 0u8..=127 {
        let s = (b as char).to_string();
        let in_range = (b'a'..=b'e').contains(&b);
        assert_eq!(range.matches(&s), in_range, "[a-e] against {:?}", s);
        assert_eq!(inverted.matches(&s), !in_range, "[!a-e] against {:?}", s);
    }
    assert!(!range.matches("ab"));
    assert!(!inverted.matches("xy"));
}

#[test]
fn test_parsed_examples() {
    let cases: &[(&str, &str, bool)] = &[
        ("ab", "ab", true),
        ("ab", "abc", false),
        ("a*", "a", true),
        ("a*", "abc", true),
        ("a*", "b", false),
        ("a*", "", false),
        ("*a", "a", true),
        ("*a", "xa", true),
        ("*a", "ax", false),
        ("/synth/*/freq", "/synth/1/freq", true),
        ("/synth/*/freq", "/synth/osc/2/freq", true),
        ("/synth/*/freq", "/synth/1/gain", false),
        ("/synth/?/freq", "/synth/12/freq", false),
        ("/mixer/[0-3]/*", "/mixer/2/gain", true),
        ("/mixer/[0-3]/*", "/mixer/4/gain", false),
        ("/mixer/[!0-3]/*", "/mixer/4/gain", true),
        ("*?*?*", "a", false),
        ("*?*?*", "ab", true),
        ("**", "", true),
        ("*-*", "a-b", true),
        ("[-x]", "-", true),
    ];
    for (pattern, input, want) in cases {
        let compiled = Pattern::parse(pattern).unwrap();
        assert_eq!(
            compiled.matches(input),
            *want,
            "{:?} against {:?}",
            pattern,
            input
        );
    }
}

#[test]
fn test_pathological_alternation_terminates() {
    let pattern = Pattern::parse(&"*a".repeat(20)).unwrap();
    let input = "a".repeat(19) + "b";
    assert!(!pattern.matches(&input));
    assert!(pattern.matches(&"a".repeat(40)));
}

#[test]
fn test_parse_errors() {
    for bad in ["[b-a]", "[abc", "/x/[", "/x/[!"] {
        let err = Pattern::parse(bad).unwrap_err();
        assert!(err.is_pattern_error(), "{:?}: {}", bad, err);
    }
}

#[test]
fn test_display_roundtrip() {
    for text in ["/a/b", "/a/*/c?", "/[abc]/[!xy]", "/é/*", "/ñandú/?"] {
        let pattern: Pattern = text.parse().unwrap();
        assert_eq!(pattern.to_string(), text);
    }
}

#[test]
fn test_display_reparses_to_same_pattern() {
    for text in ["/[a!]", "/[+-/]", "[!a!-]", "/[-]/[!-]", "/x/[a-c-]", "/é?"] {
        let pattern: Pattern = text.parse().unwrap();
        let rendered = pattern.to_string();
        let reparsed: Pattern = rendered.parse().unwrap();
        assert_eq!(reparsed, pattern, "{:?} rendered as {:?}", text, rendered);
    }
}
