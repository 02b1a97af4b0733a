use std::collections::{BTreeMap, HashMap, HashSet};

use lopdf::{self, content::Content, Dictionary, Object, ObjectId};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Outline trees deeper than this are assumed to be malformed.
const MAX_OUTLINE_DEPTH: usize = 32;
/// `/Parent` chains longer than this are treated as cyclic.
const MAX_PAGE_TREE_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font resource entry of a page.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Resource key as used by `Tf` (e.g. `b"F1"`).
    pub name: Vec<u8>,
    pub base_font: Option<String>,
    pub encoding: Option<String>,
}

/// A PDF value detached from `lopdf`, so layout code can be driven by
/// hand-built operator lists in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }
}

/// Page rectangle in PDF user space (origin bottom-left): `[llx, lly, urx, ury]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    /// US Letter, used when a page declares no usable MediaBox.
    pub const LETTER: MediaBox = MediaBox {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// One raw outline item, before page resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub level: usize,
    pub title: String,
    pub page: Option<usize>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Numeric value of an `Integer` or `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`]. Stream bodies are dropped,
/// only their dictionaries are kept.
pub fn convert_object(obj: &Object) -> PdfValue {
    fn dict_entries(dict: &Dictionary) -> Vec<(Vec<u8>, PdfValue)> {
        dict.iter().map(|(k, v)| (k.clone(), convert_object(v))).collect()
    }

    match obj {
        Object::Null => PdfValue::Null,
        Object::Boolean(b) => PdfValue::Bool(*b),
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(f) => PdfValue::Real(*f),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(s, _) => PdfValue::Str(s.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        Object::Dictionary(dict) => PdfValue::Dict(dict_entries(dict)),
        Object::Stream(stream) => PdfValue::Dict(dict_entries(&stream.dict)),
        Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM, else UTF-8,
/// else Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// What the layout pass needs from a PDF: pages, their fonts, geometry,
/// link hot zones, and decoded content streams.
pub trait PdfBackend {
    /// 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Raw (decompressed) content stream bytes of a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operator with the font's encoding hints.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError>;

    /// Rectangles of the page's `/Link` annotations, in user space.
    fn link_rects(&self, page: PageId) -> Vec<MediaBox>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// [`PdfBackend`] over an in-memory [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// A string entry of the trailer's `/Info` dictionary (`Title`, `Author`, ...).
    pub fn info_entry(&self, key: &str) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let dict = self.resolve(info).as_dict().ok()?;
        match dict.get(key.as_bytes()).ok()? {
            Object::String(bytes, _) => Some(decode_text_simple(bytes)),
            Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Walk the document outline (`/Root /Outlines`) depth-first.
    ///
    /// Entries whose destination cannot be resolved to a page (named
    /// destinations, URI actions) keep `page: None`. Cycles and absurd
    /// depths are cut off.
    pub fn outline(&self) -> Vec<OutlineItem> {
        let page_numbers: HashMap<ObjectId, usize> = self
            .doc
            .get_pages()
            .into_iter()
            .map(|(num, id)| (id, num as usize))
            .collect();

        let Some(first) = self
            .doc
            .catalog()
            .ok()
            .and_then(|cat| cat.get(b"Outlines").ok())
            .and_then(|o| self.resolve(o).as_dict().ok())
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|o| o.as_reference().ok())
        else {
            return Vec::new();
        };

        let mut items = Vec::new();
        let mut visited = HashSet::new();
        self.walk_outline(first, 1, &page_numbers, &mut visited, &mut items);
        items
    }

    fn walk_outline(
        &self,
        first: ObjectId,
        level: usize,
        page_numbers: &HashMap<ObjectId, usize>,
        visited: &mut HashSet<ObjectId>,
        items: &mut Vec<OutlineItem>,
    ) {
        if level > MAX_OUTLINE_DEPTH {
            log::warn!("outline deeper than {MAX_OUTLINE_DEPTH} levels, truncating");
            return;
        }

        let mut next = Some(first);
        while let Some(id) = next.take() {
            if !visited.insert(id) {
                log::warn!("outline item {id:?} visited twice, stopping");
                return;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                return;
            };

            let title = match item.get(b"Title") {
                Ok(Object::String(bytes, _)) => decode_text_simple(bytes),
                _ => String::new(),
            };
            items.push(OutlineItem {
                level,
                title,
                page: self.outline_target_page(item, page_numbers),
            });

            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                self.walk_outline(child, level + 1, page_numbers, visited, items);
            }
            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Page targeted by `/Dest [page ...]` or `/A << /S /GoTo /D [page ...] >>`.
    fn outline_target_page(
        &self,
        item: &Dictionary,
        page_numbers: &HashMap<ObjectId, usize>,
    ) -> Option<usize> {
        let dest = match item.get(b"Dest") {
            Ok(dest) => dest,
            Err(_) => {
                let action = self.resolve(item.get(b"A").ok()?).as_dict().ok()?;
                action.get(b"D").ok()?
            }
        };
        let target = self.resolve(dest).as_array().ok()?.first()?.as_reference().ok()?;
        page_numbers.get(&target).copied()
    }

    /// Follow a single indirect reference; anything else is returned as is.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }

    fn number(&self, obj: &Object) -> Option<f32> {
        match self.resolve(obj) {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(f) => Some(*f),
            _ => None,
        }
    }

    fn rect_from(&self, obj: &Object) -> Option<MediaBox> {
        let nums: Vec<f32> = self
            .resolve(obj)
            .as_array()
            .ok()?
            .iter()
            .filter_map(|o| self.number(o))
            .collect();
        if nums.len() != 4 {
            return None;
        }
        // Normalise: some writers store the corners in the other order.
        Some(MediaBox {
            llx: nums[0].min(nums[2]),
            lly: nums[1].min(nums[3]),
            urx: nums[0].max(nums[2]),
            ury: nums[1].max(nums[3]),
        })
    }

    /// `MediaBox` is inheritable, so walk up through `/Parent`.
    fn find_media_box(&self, dict: &Dictionary, depth: usize) -> Option<MediaBox> {
        if let Some(rect) = dict.get(b"MediaBox").ok().and_then(|o| self.rect_from(o)) {
            return Some(rect);
        }
        if depth >= MAX_PAGE_TREE_DEPTH {
            log::warn!("page tree deeper than {MAX_PAGE_TREE_DEPTH} levels, no MediaBox found");
            return None;
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent_dict = self.doc.get_dictionary(parent).ok()?;
        self.find_media_box(parent_dict, depth + 1)
    }

    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font = fonts.get(font_name)?;
        match font.get(b"Encoding").ok()? {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {e}")))?;

        let name_of = |dict: &Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: name_of(dict, b"BaseFont"),
                encoding: name_of(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {e}")))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {e}")))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        // Identity-H/V fonts use 2-byte codes that are usually Unicode.
        let identity = self
            .font_encoding_name(page, font_name)
            .is_some_and(|enc| enc.contains("Identity"));
        if identity && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }

    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError> {
        let dict = self
            .doc
            .get_dictionary(page)
            .map_err(|e| PdfError::Parse(format!("page object is not a dictionary: {e}")))?;
        Ok(self.find_media_box(dict, 0).unwrap_or_else(|| {
            log::warn!("page {page:?} has no MediaBox, assuming US Letter");
            MediaBox::LETTER
        }))
    }

    fn link_rects(&self, page: PageId) -> Vec<MediaBox> {
        let Ok(dict) = self.doc.get_dictionary(page) else {
            return Vec::new();
        };
        let Some(annots) = dict
            .get(b"Annots")
            .ok()
            .and_then(|o| self.resolve(o).as_array().ok())
        else {
            return Vec::new();
        };

        annots
            .iter()
            .filter_map(|a| self.resolve(a).as_dict().ok())
            .filter(|annot| {
                annot
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|s| s == b"Link")
            })
            .filter_map(|annot| annot.get(b"Rect").ok().and_then(|r| self.rect_from(r)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
