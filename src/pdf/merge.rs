use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::Error;
use crate::links::ResolvedLink;

fn has_type(obj: &Object, ty: &[u8]) -> bool {
    match obj {
        Object::Dictionary(dict) => matches!(dict.get(b"Type"), Ok(Object::Name(n)) if n == ty),
        _ => false,
    }
}

/// Attributes a page may inherit from its page tree; copied onto the page
/// before the old tree is discarded.
const INHERITABLE: [&[u8]; 3] = [b"MediaBox", b"Resources", b"Rotate"];

fn inline_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), Error> {
    let mut missing: Vec<&[u8]> = {
        let page = doc.get_dictionary(page_id)?;
        INHERITABLE.iter().copied().filter(|k| !page.has(k)).collect()
    };
    let mut parent = doc.get_dictionary(page_id)?.get(b"Parent").and_then(Object::as_reference).ok();
    let mut found = Vec::new();
    while let Some(parent_id) = parent {
        if missing.is_empty() {
            break;
        }
        let node = doc.get_dictionary(parent_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in found {
        page.set(key, value);
    }
    Ok(())
}

/// Concatenate PDFs page by page, in the given order, under one new page tree.
pub fn merge(documents: &[Vec<u8>]) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut next_start = 1u32;
    let mut max_id = 0u32;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for bytes in documents {
        let mut doc = Document::load_mem(bytes)?;
        doc.renumber_objects_with(next_start);
        max_id = doc.max_id;
        next_start = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            inline_inherited(&mut doc, page_id)?;
            page_ids.push(page_id);
        }
        objects.extend(doc.objects);
    }

    if page_ids.is_empty() {
        return Err(Error::Pdf("nothing to merge: no pages".into()));
    }

    objects.retain(|_, obj| !has_type(obj, b"Catalog") && !has_type(obj, b"Pages"));

    let mut merged = Document::with_version("1.7");
    merged.max_id = max_id;
    let pages_id = merged.new_object_id();
    for id in &page_ids {
        if let Some(Object::Dictionary(page)) = objects.get_mut(id) {
            page.set("Parent", pages_id);
        }
    }
    merged.objects = objects;

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set(
        "Kids",
        page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    );
    pages.set("Count", page_ids.len() as i64);
    merged.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", pages_id);
    let catalog_id = merged.add_object(catalog);
    merged.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    merged.save_to(&mut out)?;
    log::debug!(
        "Merged {} document(s) into {} page(s), {} bytes in {:.1}ms",
        documents.len(),
        page_ids.len(),
        out.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(out)
}

/// MediaBox size of every page, keyed by 1-based page number.
pub fn page_sizes(pdf: &[u8]) -> Result<BTreeMap<usize, (f32, f32)>, Error> {
    let doc = Document::load_mem(pdf)?;
    let mut sizes = BTreeMap::new();
    for (number, page_id) in doc.get_pages() {
        let page = doc.get_dictionary(page_id)?;
        let media_box = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .map_err(|_| Error::Pdf(format!("page {number} has no MediaBox")))?;
        let coords: Vec<f32> = media_box.iter().filter_map(|o| o.as_float().ok()).collect();
        let [x0, y0, x1, y1] = coords[..] else {
            return Err(Error::Pdf(format!("page {number} has a malformed MediaBox")));
        };
        sizes.insert(number as usize, (x1 - x0, y1 - y0));
    }
    Ok(sizes)
}

fn link_annotation(link: &ResolvedLink, target_page: ObjectId) -> Dictionary {
    let [x0, y0, x1, y1] = link.rect;
    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Link".to_vec()));
    annot.set(
        "Rect",
        vec![Object::Real(x0), Object::Real(y0), Object::Real(x1), Object::Real(y1)],
    );
    annot.set(
        "Border",
        vec![Object::Integer(0), Object::Integer(0), Object::Integer(1)],
    );
    annot.set(
        "C",
        vec![Object::Integer(1), Object::Integer(0), Object::Integer(0)],
    );
    annot.set(
        "Dest",
        vec![
            Object::Reference(target_page),
            Object::Name(b"XYZ".to_vec()),
            Object::Real(link.target.0),
            Object::Real(link.target.1),
            Object::Null,
        ],
    );
    annot
}

fn append_annotation(doc: &mut Document, page_id: ObjectId, annot_id: ObjectId) -> Result<(), Error> {
    let existing = doc.get_dictionary(page_id)?.get(b"Annots").ok().cloned();
    match existing {
        Some(Object::Reference(array_id)) => match doc.get_object_mut(array_id)? {
            Object::Array(annots) => annots.push(Object::Reference(annot_id)),
            _ => return Err(Error::Pdf("page /Annots does not point to an array".into())),
        },
        Some(Object::Array(mut annots)) => {
            annots.push(Object::Reference(annot_id));
            doc.get_dictionary_mut(page_id)?.set("Annots", annots);
        }
        _ => {
            doc.get_dictionary_mut(page_id)?
                .set("Annots", vec![Object::Reference(annot_id)]);
        }
    }
    Ok(())
}

/// Add a go-to link annotation for every resolved link. Page numbers are
/// 1-based; coordinates are PDF user space.
pub fn inject_links(pdf: &[u8], links: &[ResolvedLink]) -> Result<Vec<u8>, Error> {
    let mut doc = Document::load_mem(pdf)?;
    let pages = doc.get_pages();
    let page_id = |number: usize| -> Result<ObjectId, Error> {
        u32::try_from(number)
            .ok()
            .and_then(|n| pages.get(&n).copied())
            .ok_or_else(|| Error::Pdf(format!("link refers to missing page {number}")))
    };

    for link in links {
        let source = page_id(link.source_page)?;
        let target = page_id(link.target_page)?;
        let annot_id = doc.add_object(link_annotation(link, target));
        append_annotation(&mut doc, source, annot_id)?;
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    log::debug!("Injected {} link annotation(s)", links.len());
    Ok(out)
}
