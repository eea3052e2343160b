mod common;

use common::{priorities, record};
use ssb_agenda::canvas::{Rgb, color_toward_grey};
use ssb_agenda::model::{
    ImpactCategory, Label, Language, Priority, ResearchLine, RowError, StormSurgeBarrier, TimeFrame,
};

use Priority::{High, Low, Medium, Unknown};

#[test]
fn priority_flag_cases() {
    assert!(priorities([High, Medium, High, Low]).is_high());
    assert!(!priorities([Medium, Medium, Medium, Medium]).is_high());
    assert!(priorities([Medium, Medium, Medium, High]).is_high());
    assert!(!priorities([Unknown, Unknown, Unknown, Unknown]).is_high());
    assert!(!priorities([Low, Medium, Medium, Medium]).is_high());
    assert!(priorities([Unknown, Unknown, High, Unknown]).is_high());
}

#[test]
fn priority_flag_is_pure() {
    let p = priorities([Medium, Low, Medium, Medium]);
    let first = p.is_high();
    for _ in 0..10 {
        assert_eq!(p.is_high(), first);
    }
    let mut r = record("Q1", TimeFrame::Now, Some(1));
    r.priorities = p;
    assert_eq!(r.has_priority(), first);
}

#[test]
fn codes_map_to_enums() {
    assert_eq!(Priority::from_code(3), High);
    assert_eq!(Priority::from_code(0), Unknown);
    assert_eq!(Priority::from_code(7), Unknown);
    assert_eq!(TimeFrame::from_code(0), TimeFrame::NotRelevant);
    assert_eq!(TimeFrame::from_code(2), TimeFrame::NearFuture);
    assert_eq!(TimeFrame::from_code(9), TimeFrame::Unknown);
}

#[test]
fn research_lines_have_fixed_colour_groups() {
    let groups: Vec<u8> = ResearchLine::ALL.iter().map(|l| l.color_group()).collect();
    assert_eq!(groups, vec![1, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    for (i, line) in ResearchLine::ALL.iter().enumerate() {
        assert_eq!(usize::from(line.number()), i + 1);
        assert_eq!(ResearchLine::from_number(line.number()), Some(*line));
    }
    assert_eq!(ResearchLine::from_number(0), None);
    assert_eq!(ResearchLine::from_number(11), None);
    assert_eq!(ResearchLine::Cyber.base_color(), Rgb(0, 146, 69));
    assert_eq!(ResearchLine::Facilities.link_key(), "research-line-3");
}

#[test]
fn grey_fraction_pulls_toward_grey() {
    let base = Rgb(0, 112, 192);
    assert_eq!(color_toward_grey(base, TimeFrame::Now.grey_fraction()), base);
    assert_eq!(color_toward_grey(base, TimeFrame::NotRelevant.grey_fraction()), Rgb(210, 190, 210));
    let half = color_toward_grey(base, TimeFrame::NearFuture.grey_fraction());
    assert_eq!(half, Rgb(105, 151, 201));
}

#[test]
fn validation_requires_line_for_plotted_time_frames() {
    assert!(record("Q1", TimeFrame::Now, Some(2)).validate().is_ok());
    assert!(record("Q1", TimeFrame::Now, None).validate().is_err());
    assert!(record("Q1", TimeFrame::Future, None).validate().is_err());
    assert!(record("Q1", TimeFrame::NotRelevant, None).validate().is_ok());
    assert!(record("Q1", TimeFrame::Unknown, None).validate().is_ok());
    assert!(record("  ", TimeFrame::Unknown, None).validate().is_err());
}

#[test]
fn barrier_filter() {
    let mut r = record("Q1", TimeFrame::Now, Some(1));
    r.barriers = vec![StormSurgeBarrier::Ramspol];
    assert!(r.applies_to(StormSurgeBarrier::Ramspol));
    assert!(r.applies_to(StormSurgeBarrier::All));
    assert!(!r.applies_to(StormSurgeBarrier::HartelBarrier));

    r.barriers = vec![StormSurgeBarrier::All];
    assert!(r.applies_to(StormSurgeBarrier::HaringvlietBarrier));
}

#[test]
fn barrier_codes() {
    assert_eq!(StormSurgeBarrier::from_code("6SSB"), Some(StormSurgeBarrier::All));
    assert_eq!(StormSurgeBarrier::from_code(" ESB "), Some(StormSurgeBarrier::EasternScheldtBarrier));
    assert_eq!(StormSurgeBarrier::from_code("MLB"), Some(StormSurgeBarrier::MaeslantBarrier));
    assert_eq!(StormSurgeBarrier::from_code("XYZ"), None);
    for code in ["6SVK", "MLK", "HK", "RP", "HIJK", "OSK", "HV"] {
        let barrier = StormSurgeBarrier::from_code(code).expect(code);
        assert_eq!(barrier.code(), code);
    }
}

#[test]
fn impact_category_lookup_by_title() {
    for category in ImpactCategory::ALL {
        assert_eq!(ImpactCategory::from_title(category.title()), Some(category));
    }
    assert_eq!(
        ImpactCategory::from_title("  human capital for a safe and liveable delta "),
        Some(ImpactCategory::HumanCapital)
    );
    assert_eq!(ImpactCategory::from_title("Something else"), None);
}

#[test]
fn labels_exist_in_both_languages() {
    assert_eq!(Label::TimeFrame(TimeFrame::Now).text(Language::Dutch), "Nu");
    assert_eq!(Label::TimeFrame(TimeFrame::Now).text(Language::English), "Now");
    assert_eq!(Label::Related.text(Language::Dutch), "Gerelateerd");
    for line in ResearchLine::ALL {
        assert!(!Label::ResearchLine(line).text(Language::Dutch).is_empty());
        assert!(!Label::ResearchLine(line).text(Language::English).is_empty());
    }
}

#[test]
fn row_error_cell_reference() {
    let e = RowError {
        row: 6,
        column: Some(1),
        message: "missing question id".into(),
    };
    assert_eq!(e.cell_reference(), "B7");
    assert_eq!(e.to_string(), "B7: missing question id");

    let wide = RowError {
        row: 0,
        column: Some(27),
        message: String::new(),
    };
    assert_eq!(wide.cell_reference(), "AB1");

    let row_only = RowError {
        row: 9,
        column: None,
        message: String::new(),
    };
    assert_eq!(row_only.cell_reference(), "10");
}
