mod common;

use common::{FixedAdvance, config, goto_links, high_priority, page_count, record};
use ssb_agenda::document::{AgendaDocument, ImpactPathway};
use ssb_agenda::layout::{BuildContext, VisualNode};
use ssb_agenda::model::{ImpactCategory, Language, ResearchRecord, TimeFrame};
use ssb_agenda::pdf::NativeBackend;

fn categorized(id: &str, time_frame: TimeFrame, line: u8, category: ImpactCategory) -> ResearchRecord {
    let mut r = record(id, time_frame, Some(line));
    r.impact_category = Some(category);
    r
}

fn group_ids(node: &VisualNode) -> Vec<String> {
    match node {
        VisualNode::Group(g) => g.questions().iter().map(|q| q.record().id.clone()).collect(),
        other => panic!("expected a group, got {other:?}"),
    }
}

#[test]
fn every_category_gets_a_cluster_with_its_description() {
    let pathway = ImpactPathway::new(vec![categorized("P1", TimeFrame::Now, 1, ImpactCategory::HumanCapital)]);
    let mut ctx = BuildContext::new(config(), &FixedAdvance, Language::English);
    let overview = pathway.overview(&mut ctx);

    assert_eq!(overview.clusters().len(), ImpactCategory::ALL.len());
    for (cluster, category) in overview.clusters().iter().zip(ImpactCategory::ALL) {
        let text = cluster.items(3);
        assert_eq!(text.len(), 1);
        match &text[0] {
            VisualNode::PlainTextGroup(t) => {
                let joined = t.lines().join(" ");
                assert_eq!(joined, category.description());
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}

#[test]
fn overview_has_three_time_frames_and_a_blank_column() {
    let pathway = ImpactPathway::new(Vec::new());
    let mut ctx = BuildContext::new(config(), &FixedAdvance, Language::English);
    let overview = pathway.overview(&mut ctx);
    let titles: Vec<&str> = overview.columns().iter().map(|c| c.header().title()).collect();
    assert_eq!(titles, vec!["Now", "Near future", "Future", ""]);
    assert!(overview.columns()[3].header().is_blank());
    assert!(overview.columns().iter().all(|c| c.group_count() == 0));
}

#[test]
fn groups_land_in_category_cluster_and_time_frame_column() {
    let records = vec![
        categorized("P1", TimeFrame::Now, 2, ImpactCategory::ReliableBarriers),
        categorized("P2", TimeFrame::Future, 2, ImpactCategory::ReliableBarriers),
        high_priority(categorized("P3", TimeFrame::Now, 2, ImpactCategory::ReliableBarriers)),
        categorized("P4", TimeFrame::Now, 9, ImpactCategory::ReliableBarriers),
        categorized("P5", TimeFrame::NearFuture, 5, ImpactCategory::Example),
    ];
    let pathway = ImpactPathway::new(records);
    let mut ctx = BuildContext::new(config(), &FixedAdvance, Language::English);
    let overview = pathway.overview(&mut ctx);
    let clusters = overview.clusters();

    let reliable = &clusters[1];
    let now = reliable.items(0);
    assert_eq!(now.len(), 2);
    assert_eq!(group_ids(&now[0]), vec!["P3", "P1"]);
    assert_eq!(group_ids(&now[1]), vec!["P4"]);
    assert_eq!(group_ids(&reliable.items(2)[0]), vec!["P2"]);
    assert!(reliable.items(1).is_empty());

    let example = &clusters[4];
    assert_eq!(group_ids(&example.items(1)[0]), vec!["P5"]);

    // Clusters without records hold only the description column.
    assert_eq!(clusters[0].column_numbers().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn records_outside_the_plotted_grid_stay_off_the_overview() {
    let mut no_category = record("P1", TimeFrame::Now, Some(1));
    no_category.impact_category = None;
    let records = vec![
        no_category,
        categorized("P2", TimeFrame::NotRelevant, 1, ImpactCategory::HumanCapital),
    ];
    let pathway = ImpactPathway::new(records);
    let mut ctx = BuildContext::new(config(), &FixedAdvance, Language::English);
    let overview = pathway.overview(&mut ctx);
    for cluster in overview.clusters() {
        assert_eq!(cluster.column_numbers().collect::<Vec<_>>(), vec![3]);
    }

    // Both still get a details row.
    let pages = pathway.pages(&mut BuildContext::new(config(), &FixedAdvance, Language::English)).expect("pages");
    assert_eq!(pages.len(), 2);
}

#[test]
fn pathway_links_group_titles_and_questions() {
    let records = vec![
        categorized("P1", TimeFrame::Now, 1, ImpactCategory::MaintenanceDecisions),
        categorized("P2", TimeFrame::NearFuture, 4, ImpactCategory::MaintenanceDecisions),
    ];
    let pathway = ImpactPathway::new(records);
    let (pages, assembly) = pathway
        .assemble(config(), &FixedAdvance, &NativeBackend::default())
        .expect("assemble");

    assert_eq!(pages.len(), 3);
    assert_eq!(page_count(&assembly.linked), 3);
    let per_page: Vec<usize> = goto_links(&assembly.linked).iter().map(Vec::len).collect();
    // Two question ids and two group titles on the overview.
    assert_eq!(per_page, vec![4, 0, 0]);
}
