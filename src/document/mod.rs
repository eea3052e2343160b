//! Document builders: records in, one cross-referenced PDF out.

mod calendar;
pub mod helpers;
mod pathway;

pub use calendar::KnowledgeCalendar;
pub use pathway::ImpactPathway;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::canvas::Canvas;
use crate::error::Error;
use crate::fonts::TextMeasure;
use crate::layout::{BuildContext, LayoutConfiguration, OverviewPage};
use crate::links::LinkRegistry;
use crate::model::{Language, ResearchRecord};
use crate::pdf::{NativeBackend, PdfBackend};

/// One drawn page, ready to be rasterized. `label` names the page's
/// intermediate file.
#[derive(Clone, Debug)]
pub struct Page {
    pub label: String,
    pub canvas: Canvas,
}

/// Where and how a build writes its files.
#[derive(Clone, Debug)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    pub name: String,
    /// Also write every single-page PDF and the merged PDF before link injection.
    pub keep_intermediate: bool,
}

impl OutputOptions {
    pub fn new(output_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            name: name.into(),
            keep_intermediate: false,
        }
    }

    pub fn final_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.name))
    }

    fn intermediate_path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{} - {}.pdf", self.name, suffix))
    }
}

/// Every byte blob a build produced, in pipeline order.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub pages: Vec<Vec<u8>>,
    pub unlinked: Vec<u8>,
    pub linked: Vec<u8>,
    pub link_count: usize,
}

/// Shared orchestration of the knowledge calendar and the impact pathway:
/// overview first, details pages after it, then rasterize, merge and link.
pub trait AgendaDocument {
    fn records(&self) -> &[ResearchRecord];

    fn language(&self) -> Language;

    /// The overview page, numbered 1.
    fn overview(&self, ctx: &mut BuildContext) -> OverviewPage;

    /// Lay out and draw every page in final order. Link sources and targets
    /// land in `ctx.links`.
    fn pages(&self, ctx: &mut BuildContext) -> Result<Vec<Page>, Error> {
        let t0 = Instant::now();
        helpers::fit_id_box(&mut ctx.config, self.records(), ctx.measure);

        let overview = self.overview(ctx);
        let details = helpers::details_pages(self.records(), ctx, 2);
        let t_group = t0.elapsed();

        let mut pages = Vec::with_capacity(details.len() + 1);
        pages.push(Page {
            label: "overview".to_string(),
            canvas: overview.render(ctx)?,
        });
        for page in details {
            let label = match page.target_key() {
                Some(key) => format!("details - {key}"),
                None => "details - no-research-line".to_string(),
            };
            pages.push(Page {
                label,
                canvas: page.render(ctx)?,
            });
        }

        log::info!(
            "Layout: {} page(s), group={:.1}ms, draw={:.1}ms",
            pages.len(),
            t_group.as_secs_f64() * 1000.0,
            (t0.elapsed() - t_group).as_secs_f64() * 1000.0,
        );
        Ok(pages)
    }

    /// Draw every page and run the PDF pipeline in memory.
    fn assemble(
        &self,
        config: LayoutConfiguration,
        measure: &dyn TextMeasure,
        backend: &dyn PdfBackend,
    ) -> Result<(Vec<Page>, Assembly), Error> {
        let mut ctx = BuildContext::new(config, measure, self.language());
        let pages = self.pages(&mut ctx)?;
        let assembly = assemble(&pages, &ctx.links, backend)?;
        Ok((pages, assembly))
    }

    /// Full build with the native backend drawing in the measured face;
    /// returns the path of the final PDF.
    fn build(
        &self,
        config: LayoutConfiguration,
        measure: &dyn TextMeasure,
        output: &OutputOptions,
    ) -> Result<PathBuf, Error> {
        let (pages, assembly) = self.assemble(config, measure, &NativeBackend::for_measure(measure))?;
        write_outputs(&pages, &assembly, output)
    }
}

/// Rasterize each page, merge them in order, then add a link annotation for
/// every resolvable cross-reference.
pub fn assemble(pages: &[Page], links: &LinkRegistry, backend: &dyn PdfBackend) -> Result<Assembly, Error> {
    let t0 = Instant::now();
    let rendered = pages
        .iter()
        .map(|page| backend.render(&page.canvas))
        .collect::<Result<Vec<_>, _>>()?;
    let t_render = t0.elapsed();

    let unlinked = backend.merge(&rendered)?;
    let t_merge = t0.elapsed();

    let sizes = backend.page_sizes(&unlinked)?;
    let resolved = links.resolve(&sizes)?;
    let linked = backend.inject_links(&unlinked, &resolved)?;
    let t_link = t0.elapsed();

    log::info!(
        "PDF: rasterize={:.1}ms, merge={:.1}ms, link={:.1}ms ({} link(s), {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_merge - t_render).as_secs_f64() * 1000.0,
        (t_link - t_merge).as_secs_f64() * 1000.0,
        resolved.len(),
        linked.len(),
    );

    Ok(Assembly {
        pages: rendered,
        unlinked,
        linked,
        link_count: resolved.len(),
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    std::fs::write(path, bytes).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })
}

pub fn write_outputs(pages: &[Page], assembly: &Assembly, output: &OutputOptions) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(&output.output_dir)?;
    if output.keep_intermediate {
        for (page, bytes) in pages.iter().zip(&assembly.pages) {
            write_file(&output.intermediate_path(&page.label), bytes)?;
        }
        write_file(&output.intermediate_path("no links"), &assembly.unlinked)?;
    }
    let path = output.final_path();
    write_file(&path, &assembly.linked)?;
    log::info!("Wrote {} ({} bytes)", path.display(), assembly.linked.len());
    Ok(path)
}
