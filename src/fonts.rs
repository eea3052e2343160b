use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;

/// Text-measurement oracle used by the layout engine.
///
/// Implementations must be deterministic for a given `(text, font_size)` pair:
/// wrapping and every node height are derived from these numbers.
pub trait TextMeasure {
    /// Returns `(width, height)` in canvas pixels.
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32);

    fn width(&self, text: &str, font_size: f32) -> f32 {
        self.measure(text, font_size).0
    }

    /// Width of `text` drawn in the bold weight.
    fn bold_width(&self, text: &str, font_size: f32) -> f32 {
        self.width(text, font_size)
    }

    /// The face the renderer has to embed for these widths to hold.
    /// `None` means the standard Helvetica faces.
    fn face(&self) -> Option<&TrueTypeMetrics> {
        None
    }
}

/// Helvetica (metric-compatible with Arial) advance widths, 1000 units per em.
/// Characters outside WinAnsi are drawn as `?` and measured as such.
pub struct BuiltinMetrics {
    widths_1000: Vec<f32>,
    bold_widths_1000: Vec<f32>,
}

impl BuiltinMetrics {
    pub fn helvetica() -> Self {
        Self {
            widths_1000: helvetica_widths(false),
            bold_widths_1000: helvetica_widths(true),
        }
    }

    pub fn helvetica_bold() -> Self {
        Self {
            widths_1000: helvetica_widths(true),
            bold_widths_1000: helvetica_widths(true),
        }
    }

    fn text_width(table: &[f32], text: &str, font_size: f32) -> f32 {
        to_winansi_bytes(text)
            .into_iter()
            .map(|byte| table.get(byte.saturating_sub(32) as usize).copied().unwrap_or(0.0))
            .sum::<f32>()
            * font_size
            / 1000.0
    }
}

impl Default for BuiltinMetrics {
    fn default() -> Self {
        Self::helvetica()
    }
}

impl TextMeasure for BuiltinMetrics {
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
        (Self::text_width(&self.widths_1000, text, font_size), font_size)
    }

    fn bold_width(&self, text: &str, font_size: f32) -> f32 {
        Self::text_width(&self.bold_widths_1000, text, font_size)
    }
}

#[derive(Clone, Copy, Debug)]
struct Glyph {
    id: u16,
    advance_1000: f32,
}

/// A TrueType/OpenType face used both to measure text and to draw it.
///
/// The renderer embeds this face, so every width here is the width on the
/// page. Characters the face has no glyph for are drawn with its `?` glyph
/// (or `.notdef` when there is none) and measured the same way. Bold runs
/// are drawn with the same glyphs, so bold and regular widths agree.
#[derive(Debug)]
pub struct TrueTypeMetrics {
    name: String,
    data: Mmap,
    line_h_ratio: f32,
    ascender_ratio: f32,
    fallback: Glyph,
    glyphs: RefCell<HashMap<char, Option<Glyph>>>,
}

impl TrueTypeMetrics {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let data = unsafe { Mmap::map(&file) }?;
        let face = Face::parse(&data, 0).map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("cannot parse font {}: {e}", path.display()),
            ))
        })?;

        let units = face.units_per_em() as f32;
        let line_gap = face.line_gap() as f32;
        let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
        let ascender_ratio = face.ascender() as f32 / units;
        let fallback_id = face.glyph_index('?').unwrap_or(GlyphId(0));
        let fallback = Glyph {
            id: fallback_id.0,
            advance_1000: advance_1000(&face, fallback_id),
        };
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().replace(' ', ""))
            .unwrap_or_else(|| "EmbeddedFont".into());
        log::debug!(
            "Loaded {} ({} glyphs, {} units/em)",
            path.display(),
            face.number_of_glyphs(),
            face.units_per_em()
        );

        Ok(Self {
            name,
            data,
            line_h_ratio,
            ascender_ratio,
            fallback,
            glyphs: RefCell::new(HashMap::new()),
        })
    }

    /// Baseline offset below the top of the em box, as a fraction of the
    /// font size.
    pub fn ascender_ratio(&self) -> f32 {
        self.ascender_ratio
    }

    fn parse_face(&self) -> Result<Face<'_>, Error> {
        Face::parse(&self.data, 0).map_err(|e| Error::Pdf(format!("cannot parse font {}: {e}", self.name)))
    }

    /// The face's own glyph for `ch`, or `None` when it has none.
    fn lookup(&self, ch: char) -> Option<Glyph> {
        if let Some(found) = self.glyphs.borrow().get(&ch) {
            return *found;
        }
        let found = self.parse_face().ok().and_then(|face| {
            face.glyph_index(ch).map(|gid| Glyph {
                id: gid.0,
                advance_1000: advance_1000(&face, gid),
            })
        });
        self.glyphs.borrow_mut().insert(ch, found);
        found
    }

    fn glyph(&self, ch: char) -> Glyph {
        self.lookup(ch).unwrap_or(self.fallback)
    }

    /// Embed the face as a Type0 font with Identity-H encoding, subset to the
    /// glyphs of `used`. Returns the two-byte code to show for each char.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        used: &BTreeSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<HashMap<char, u16>, Error> {
        let face = self.parse_face()?;
        let units = face.units_per_em() as f32;
        let scale = |v: f32| v / units * 1000.0;
        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            scale(bb.x_min as f32),
            scale(bb.y_min as f32),
            scale(bb.x_max as f32),
            scale(bb.y_max as f32),
        );

        let mut remapper = subsetter::GlyphRemapper::new();
        remapper.remap(0);
        let mut codes = HashMap::new();
        let mut widths = BTreeMap::new();
        let mut unicode = BTreeMap::new();
        for &ch in used {
            let (glyph, shown) = match self.lookup(ch) {
                Some(glyph) => (glyph, ch),
                None => (self.fallback, '?'),
            };
            let code = remapper.remap(glyph.id);
            codes.insert(ch, code);
            widths.insert(code, glyph.advance_1000);
            unicode.entry(code).or_insert(shown);
        }

        let font_data = subsetter::subset(&self.data, 0, &remapper).unwrap_or_else(|e| {
            log::warn!("Font subsetting failed for {}: {e}, embedding full font", self.name);
            self.data.to_vec()
        });
        let data_len = i32::try_from(font_data.len())
            .map_err(|_| Error::Pdf(format!("font {} is too large to embed", self.name)))?;
        let data_ref = alloc();
        pdf.stream(data_ref, &font_data).pair(Name(b"Length1"), data_len);

        let descriptor_ref = alloc();
        pdf.font_descriptor(descriptor_ref)
            .name(Name(self.name.as_bytes()))
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(bbox)
            .italic_angle(0.0)
            .ascent(scale(face.ascender() as f32))
            .descent(scale(face.descender() as f32))
            .cap_height(face.capital_height().map(|h| scale(h as f32)).unwrap_or(700.0))
            .stem_v(80.0)
            .font_file2(data_ref);

        let cid_font_ref = alloc();
        {
            let mut cid = pdf.cid_font(cid_font_ref);
            cid.subtype(CidFontType::Type2)
                .base_font(Name(self.name.as_bytes()))
                .system_info(identity_system_info())
                .font_descriptor(descriptor_ref)
                .default_width(0.0)
                .cid_to_gid_map_predefined(Name(b"Identity"));
            let mut w = cid.widths();
            for (&code, &width) in &widths {
                w.consecutive(code, [width]);
            }
        }

        let to_unicode_ref = alloc();
        let cmap_name = format!("{}-UTF16", self.name);
        let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
        for (&code, &ch) in &unicode {
            cmap.pair(code, ch);
        }
        pdf.stream(to_unicode_ref, cmap.finish().as_slice());

        pdf.type0_font(font_ref)
            .base_font(Name(self.name.as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_ref)
            .to_unicode(to_unicode_ref);

        log::debug!("Embedded {} with {} glyphs", self.name, widths.len());
        Ok(codes)
    }
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

fn advance_1000(face: &Face<'_>, gid: GlyphId) -> f32 {
    face.glyph_hor_advance(gid)
        .map(|adv| adv as f32 / face.units_per_em() as f32 * 1000.0)
        .unwrap_or(0.0)
}

impl TextMeasure for TrueTypeMetrics {
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
        let w: f32 = text.chars().map(|ch| self.glyph(ch).advance_1000).sum::<f32>() * font_size / 1000.0;
        (w, font_size * self.line_h_ratio)
    }

    fn face(&self) -> Option<&TrueTypeMetrics> {
        Some(self)
    }
}

/// Pick the measurement oracle: an explicit font file if one is given and
/// readable, otherwise the built-in Helvetica table.
pub fn load_measure(font: Option<&Path>) -> Box<dyn TextMeasure> {
    match font {
        Some(path) => match TrueTypeMetrics::load(path) {
            Ok(m) => Box::new(m),
            Err(e) => {
                log::warn!("Falling back to built-in Helvetica metrics: {e}");
                Box::new(BuiltinMetrics::helvetica())
            }
        },
        None => Box::new(BuiltinMetrics::helvetica()),
    }
}

/// Width of `text` as the renderer draws it with the standard 14 Helvetica faces.
pub(crate) fn helvetica_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let metrics = BuiltinMetrics::helvetica();
    if bold {
        metrics.bold_width(text, font_size)
    } else {
        metrics.width(text, font_size)
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters are replaced by `?`.
pub fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            b => b,
        })
        .collect()
}

const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Helvetica widths at 1000 units/em for WinAnsi chars 32..=255. Above ASCII,
/// Latin-1 letters take the width of their unaccented base letter.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    let ascii = if bold {
        &HELVETICA_BOLD_ASCII
    } else {
        &HELVETICA_ASCII
    };
    let ascii_width = |c: char| ascii[(c as usize) - 32] as f32;
    (32u8..=255u8)
        .map(|b| match b {
            32..=126 => ascii[(b - 32) as usize] as f32,
            0xC0..=0xC5 => ascii_width('A'),
            0xC7 => ascii_width('C'),
            0xC8..=0xCB => ascii_width('E'),
            0xCC..=0xCF => ascii_width('I'),
            0xD1 => ascii_width('N'),
            0xD2..=0xD6 | 0xD8 => ascii_width('O'),
            0xD9..=0xDC => ascii_width('U'),
            0xE0..=0xE5 => ascii_width('a'),
            0xE7 => ascii_width('c'),
            0xE8..=0xEB => ascii_width('e'),
            0xEC..=0xEF => ascii_width('i'),
            0xF1 => ascii_width('n'),
            0xF2..=0xF6 | 0xF8 => ascii_width('o'),
            0xF9..=0xFC => ascii_width('u'),
            0xFD | 0xFF => ascii_width('y'),
            0x95 => 350.0,
            0x96 => 556.0,
            0x97 => 1000.0,
            0x91 | 0x92 => 222.0,
            0x93 | 0x94 => 333.0,
            _ => 556.0,
        })
        .collect()
}
