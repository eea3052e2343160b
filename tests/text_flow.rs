mod common;

use common::FixedAdvance;
use ssb_agenda::fonts::TextMeasure;
use ssb_agenda::layout::wrap;

const SAMPLE: &str = "The barrier gates are closed when the expected water level in Rotterdam \
exceeds the closing criterion, which makes the availability of the operating system \
a dominant term in the probability of failure.";

#[test]
fn empty_text_has_no_lines() {
    assert!(wrap("", 100.0, 10.0, &FixedAdvance).is_empty());
    assert!(wrap("   \n\t ", 100.0, 10.0, &FixedAdvance).is_empty());
}

#[test]
fn lines_respect_the_width() {
    for width in [60.0, 120.0, 200.0, 333.0, 1000.0] {
        let lines = wrap(SAMPLE, width, 10.0, &FixedAdvance);
        assert!(!lines.is_empty());
        for line in &lines {
            let single_word = !line.contains(' ');
            assert!(
                single_word || FixedAdvance.width(line, 10.0) <= width,
                "line '{line}' is wider than {width}"
            );
        }
    }
}

#[test]
fn wrapping_keeps_every_word_in_order() {
    let lines = wrap(SAMPLE, 150.0, 10.0, &FixedAdvance);
    let rejoined = lines.join(" ");
    let expected: Vec<&str> = SAMPLE.split_whitespace().collect();
    assert_eq!(rejoined.split(' ').collect::<Vec<_>>(), expected);
}

#[test]
fn rewrapping_is_idempotent() {
    for width in [45.0, 100.0, 250.0] {
        let first = wrap(SAMPLE, width, 12.0, &FixedAdvance);
        let second = wrap(&first.join(" "), width, 12.0, &FixedAdvance);
        assert_eq!(first, second, "width {width}");
    }
}

#[test]
fn overlong_word_sits_alone() {
    // 5px per character at font size 10.
    let lines = wrap("a Rijkswaterstaatsdirectie b", 40.0, 10.0, &FixedAdvance);
    assert_eq!(lines, vec!["a", "Rijkswaterstaatsdirectie", "b"]);
}

#[test]
fn greedy_break_points() {
    // "aaa bbb" is 35px, "aaa bbb ccc" 55px.
    let lines = wrap("aaa bbb ccc ddd", 40.0, 10.0, &FixedAdvance);
    assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
}

#[test]
fn candidate_exactly_at_width_fits() {
    let lines = wrap("aaa bbb", 35.0, 10.0, &FixedAdvance);
    assert_eq!(lines, vec!["aaa bbb"]);
}
