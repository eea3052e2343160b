mod common;

use std::cell::RefCell;
use std::collections::BTreeMap;

use common::{goto_links, page_count, uri_link_count};
use ssb_agenda::Error;
use ssb_agenda::canvas::{Canvas, Gradient, Paint, Rgb, Stroke, TextRun};
use ssb_agenda::document::{Page, assemble};
use ssb_agenda::links::{LinkRegistry, ResolvedLink};
use ssb_agenda::pdf::{self, NativeBackend, PdfBackend};

fn sample_canvas(width: f32, height: f32) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.rect(10.0, 10.0, 100.0, 40.0, Some(Paint::Solid(Rgb(0, 112, 192))), None);
    let gradient = canvas.add_gradient(
        Gradient::linear(0.0, 0.0, 1.0, 0.0)
            .stop(0.0, Rgb::WHITE)
            .stop(1.0, Rgb(0, 146, 69)),
    );
    canvas.polygon(
        vec![(0.0, 0.0), (50.0, 0.0), (60.0, 20.0), (0.0, 20.0)],
        Some(Paint::Gradient(gradient)),
        Some(Stroke::new(Rgb::BLACK, 1.0)),
    );
    canvas.line((0.0, 100.0), (100.0, 100.0), Stroke::new(Rgb::BLACK, 2.0).round());
    canvas.circle(50.0, 50.0, 5.0, Some(Paint::Solid(Rgb::BLACK)), None);
    canvas.text(TextRun::new("Maeslantkering €", 20.0, 30.0, 12.0).bold());
    canvas
}

fn media_box(pdf_bytes: &[u8]) -> Vec<f32> {
    let doc = lopdf::Document::load_mem(pdf_bytes).expect("load pdf");
    let page_id = doc.get_pages()[&1];
    doc.get_dictionary(page_id)
        .expect("page")
        .get(b"MediaBox")
        .and_then(lopdf::Object::as_array)
        .expect("media box")
        .iter()
        .map(|o| o.as_float().expect("number"))
        .collect()
}

#[test]
fn rendered_page_is_scaled_to_points() {
    let bytes = pdf::render(&sample_canvas(1000.0, 400.0)).expect("render");
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_count(&bytes), 1);
    assert_eq!(media_box(&bytes), vec![0.0, 0.0, 750.0, 300.0]);
}

#[test]
fn uri_links_become_action_annotations() {
    let mut canvas = Canvas::new(200.0, 100.0);
    canvas.uri_link(10.0, 10.0, 50.0, 10.0, "mailto:someone@example.org");
    let bytes = pdf::render(&canvas).expect("render");
    assert_eq!(uri_link_count(&bytes), 1);
    assert!(goto_links(&bytes)[0].is_empty());
}

#[test]
fn merge_keeps_page_order_and_sizes() {
    let pages: Vec<Vec<u8>> = [(400.0, 200.0), (800.0, 400.0), (100.0, 100.0)]
        .into_iter()
        .map(|(w, h)| pdf::render(&sample_canvas(w, h)).expect("render"))
        .collect();
    let merged = pdf::merge(&pages).expect("merge");
    assert_eq!(page_count(&merged), 3);

    let sizes = pdf::page_sizes(&merged).expect("sizes");
    assert_eq!(
        sizes,
        BTreeMap::from([(1, (300.0, 150.0)), (2, (600.0, 300.0)), (3, (75.0, 75.0))])
    );
}

#[test]
fn merging_nothing_is_an_error() {
    assert!(matches!(pdf::merge(&[]), Err(Error::Pdf(_))));
}

#[test]
fn garbage_input_is_a_pdf_error() {
    assert!(matches!(pdf::page_sizes(b"not a pdf at all"), Err(Error::Pdf(_))));
}

#[test]
fn injected_links_point_at_target_pages() {
    let pages: Vec<Vec<u8>> = (0..2)
        .map(|_| pdf::render(&sample_canvas(400.0, 400.0)).expect("render"))
        .collect();
    let merged = pdf::merge(&pages).expect("merge");

    let links = [
        ResolvedLink {
            source_page: 1,
            rect: [10.0, 10.0, 60.0, 20.0],
            target_page: 2,
            target: (0.0, 300.0),
        },
        ResolvedLink {
            source_page: 1,
            rect: [10.0, 30.0, 60.0, 40.0],
            target_page: 2,
            target: (0.0, 200.0),
        },
        ResolvedLink {
            source_page: 2,
            rect: [10.0, 10.0, 60.0, 20.0],
            target_page: 1,
            target: (0.0, 300.0),
        },
    ];
    let linked = pdf::inject_links(&merged, &links).expect("inject");
    let per_page: Vec<usize> = goto_links(&linked).iter().map(Vec::len).collect();
    assert_eq!(per_page, vec![2, 1]);

    let doc = lopdf::Document::load_mem(&linked).expect("load");
    let page_two = doc.get_pages()[&2];
    let dest = goto_links(&linked)[0][0]
        .get(b"Dest")
        .and_then(lopdf::Object::as_array)
        .expect("dest")
        .clone();
    assert_eq!(dest[0].as_reference().expect("page ref"), page_two);
}

#[test]
fn link_to_missing_page_is_an_error() {
    let single = pdf::render(&sample_canvas(100.0, 100.0)).expect("render");
    let link = ResolvedLink {
        source_page: 1,
        rect: [0.0, 0.0, 1.0, 1.0],
        target_page: 4,
        target: (0.0, 0.0),
    };
    match pdf::inject_links(&single, &[link]) {
        Err(Error::Pdf(msg)) => assert!(msg.contains('4')),
        other => panic!("expected pdf error, got {:?}", other.map(|b| b.len())),
    }
}

/// Records every call and delegates to the native backend.
#[derive(Default)]
struct Recording {
    calls: RefCell<Vec<String>>,
    links: RefCell<Vec<ResolvedLink>>,
}

impl PdfBackend for Recording {
    fn render(&self, canvas: &Canvas) -> Result<Vec<u8>, Error> {
        self.calls.borrow_mut().push(format!("render {}x{}", canvas.width(), canvas.height()));
        NativeBackend::default().render(canvas)
    }

    fn merge(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>, Error> {
        self.calls.borrow_mut().push(format!("merge {}", documents.len()));
        NativeBackend::default().merge(documents)
    }

    fn page_sizes(&self, pdf: &[u8]) -> Result<BTreeMap<usize, (f32, f32)>, Error> {
        self.calls.borrow_mut().push("page_sizes".into());
        NativeBackend::default().page_sizes(pdf)
    }

    fn inject_links(&self, pdf: &[u8], links: &[ResolvedLink]) -> Result<Vec<u8>, Error> {
        self.calls.borrow_mut().push("inject_links".into());
        self.links.borrow_mut().extend_from_slice(links);
        NativeBackend::default().inject_links(pdf, links)
    }
}

#[test]
fn assemble_runs_the_pipeline_in_order() {
    let pages = vec![
        Page {
            label: "overview".into(),
            canvas: sample_canvas(800.0, 600.0),
        },
        Page {
            label: "details - research-line-1".into(),
            canvas: sample_canvas(400.0, 400.0),
        },
    ];
    let mut links = LinkRegistry::new();
    links.register_page(1, 800.0, 600.0);
    links.register_page(2, 400.0, 400.0);
    links.register_link("Q1", 1, 100.0, 100.0, 20.0, 12.0);
    links.register_link_target("Q1", 2, 20.0, 40.0);

    let backend = Recording::default();
    let assembly = assemble(&pages, &links, &backend).expect("assemble");

    assert_eq!(
        *backend.calls.borrow(),
        vec!["render 800x600", "render 400x400", "merge 2", "page_sizes", "inject_links"]
    );
    assert_eq!(assembly.pages.len(), 2);
    assert_eq!(assembly.link_count, 1);

    let link = backend.links.borrow()[0];
    assert_eq!(link.source_page, 1);
    assert_eq!(link.target_page, 2);
    assert!((link.target.0 - 15.0).abs() < 1e-3);
    assert!((link.target.1 - 270.0).abs() < 1e-3);
}
