use apidb_bulk::copy::escape::escape;

#[test]
fn plain_text_is_borrowed_unchanged() {
    assert_eq!(escape("highway"), "highway");
    assert_eq!(escape("Straße am Förderturm"), "Straße am Förderturm");
}

#[test]
fn control_characters_become_two_character_escapes() {
    assert_eq!(escape("a\tb"), "a\\tb");
    assert_eq!(escape("a\nb"), "a\\nb");
    assert_eq!(escape("a\rb"), "a\\rb");
    assert_eq!(escape("a\u{8}b"), "a\\bb");
    assert_eq!(escape("a\u{b}b"), "a\\vb");
    assert_eq!(escape("a\u{c}b"), "a\\fb");
}

#[test]
fn backslash_is_doubled_before_control_escapes() {
    assert_eq!(escape("\\"), "\\\\");
    // a literal backslash followed by the letter t must not collide with an
    // escaped tab
    assert_eq!(escape("\\t"), "\\\\t");
    assert_eq!(escape("\t"), "\\t");
}

#[test]
fn escape_distributes_over_concatenation() {
    let samples = ["plain", "tab\there", "\\weird\n", "", "mixed\r\\\u{c}"];
    for a in samples {
        for b in samples {
            let joined = format!("{a}{b}");
            assert_eq!(escape(&joined), format!("{}{}", escape(a), escape(b)));
        }
    }
}
