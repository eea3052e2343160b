use std::collections::BTreeMap;

use crate::error::Error;

/// A clickable rectangle on a page, in canvas pixels (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkSource {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Jump destination on a page, in canvas pixels (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkTarget {
    pub page: usize,
    pub x: f32,
    pub y: f32,
}

/// A source/target pair whose id was registered on both sides.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossReference {
    pub id: String,
    pub source: LinkSource,
    pub target: LinkTarget,
}

/// A link annotation ready for injection, in PDF user space (bottom-left origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLink {
    pub source_page: usize,
    /// `[x0, y0, x1, y1]`
    pub rect: [f32; 4],
    pub target_page: usize,
    pub target: (f32, f32),
}

/// Cross-reference bookkeeping for one document build.
///
/// Sources and targets are collected while pages are drawn and only resolved
/// once every page has been rendered and merged. Page numbers are 1-based and
/// follow the final merge order.
#[derive(Clone, Debug, Default)]
pub struct LinkRegistry {
    sources: BTreeMap<String, Vec<LinkSource>>,
    targets: BTreeMap<String, LinkTarget>,
    pages: BTreeMap<usize, (f32, f32)>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_link(&mut self, target_id: &str, page: usize, x: f32, y: f32, w: f32, h: f32) {
        self.sources
            .entry(target_id.to_string())
            .or_default()
            .push(LinkSource { page, x, y, w, h });
    }

    /// Overwrites any earlier target registered under the same id.
    pub fn register_link_target(&mut self, target_id: &str, page: usize, x: f32, y: f32) {
        self.targets
            .insert(target_id.to_string(), LinkTarget { page, x, y });
    }

    pub fn register_page(&mut self, page: usize, width: f32, height: f32) {
        self.pages.insert(page, (width, height));
    }

    pub fn sources(&self, target_id: &str) -> &[LinkSource] {
        self.sources.get(target_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn target(&self, target_id: &str) -> Option<LinkTarget> {
        self.targets.get(target_id).copied()
    }

    pub fn page_size(&self, page: usize) -> Option<(f32, f32)> {
        self.pages.get(&page).copied()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every source whose id also has a target. Ids without a target are
    /// dropped here.
    pub fn cross_references(&self) -> Vec<CrossReference> {
        let mut out = Vec::new();
        for (id, sources) in &self.sources {
            let Some(target) = self.targets.get(id) else {
                log::debug!("Dropping {} link source(s) for '{id}': no target", sources.len());
                continue;
            };
            out.extend(sources.iter().map(|source| CrossReference {
                id: id.clone(),
                source: *source,
                target: *target,
            }));
        }
        out
    }

    /// Scale every cross reference from canvas pixels into the PDF user space
    /// of the merged document. `pdf_pages` maps page number to MediaBox
    /// `(width, height)`.
    pub fn resolve(&self, pdf_pages: &BTreeMap<usize, (f32, f32)>) -> Result<Vec<ResolvedLink>, Error> {
        let scale = |page: usize| -> Result<PageScale, Error> {
            let canvas = self
                .page_size(page)
                .ok_or_else(|| Error::Layout(format!("page {page} was never registered")))?;
            let pdf = pdf_pages
                .get(&page)
                .copied()
                .ok_or_else(|| Error::Pdf(format!("merged document has no page {page}")))?;
            Ok(PageScale::new(canvas, pdf))
        };

        self.cross_references()
            .into_iter()
            .map(|xref| {
                let s = scale(xref.source.page)?;
                let t = scale(xref.target.page)?;
                let LinkSource { x, y, w, h, .. } = xref.source;
                Ok(ResolvedLink {
                    source_page: xref.source.page,
                    rect: [s.x(x), s.y(y + h), s.x(x + w), s.y(y)],
                    target_page: xref.target.page,
                    target: (t.x(xref.target.x), t.y(xref.target.y)),
                })
            })
            .collect()
    }
}

/// Canvas-to-PDF mapping for one page: scale each axis by the size ratio and
/// flip y to a bottom-left origin.
#[derive(Clone, Copy, Debug)]
pub struct PageScale {
    sx: f32,
    sy: f32,
    pdf_height: f32,
}

impl PageScale {
    pub fn new(canvas: (f32, f32), pdf: (f32, f32)) -> Self {
        Self {
            sx: pdf.0 / canvas.0,
            sy: pdf.1 / canvas.1,
            pdf_height: pdf.1,
        }
    }

    pub fn x(&self, x: f32) -> f32 {
        x * self.sx
    }

    pub fn y(&self, y: f32) -> f32 {
        self.pdf_height - y * self.sy
    }
}
