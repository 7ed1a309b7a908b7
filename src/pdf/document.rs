//! Structural PDF editing on top of `lopdf`.
//!
//! [`PdfDocument`] exposes only the primitives the executors need: page
//! geometry, placing a page's content through an affine transform, page-range
//! extraction, appending another document, break annotations, form
//! flattening, annotation/outline stripping and (optimised) writes.
//!
//! ## Why wrap pages in a Form XObject?
//!
//! Placing a page means drawing its existing content through a new `cm`
//! matrix onto a page of a different size. Wrapping the original content
//! stream in a Form XObject keeps its resources and graphics state sealed
//! off, so the new content stream is a single `q … cm /Pg Do Q` and nothing
//! inside the original stream needs to be parsed or rewritten.
//!
//! ## Inherited attributes
//!
//! `MediaBox`, `CropBox`, `Resources` and `Rotate` may live on any ancestor
//! `Pages` node. Operations that move pages between trees (merge, range
//! extraction) first copy those attributes onto every page so nothing is
//! lost when the intermediate nodes disappear.

use crate::error::PdfError;
use crate::geometry::{Affine, PageGeometry, PageSize, Rotation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page boxes other than MediaBox are dropped when a page is re-placed.
const SECONDARY_BOXES: [&[u8]; 4] = [b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Guard against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Resource name of the wrapped source page inside a placed page.
const PAGE_XOBJECT: &str = "PdfJobPage";

/// Annotation flags that keep a widget off screen.
const HIDDEN_FLAGS: i64 = 2 | 32;

/// An open PDF document.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    doc: Document,
    path: PathBuf,
}

impl PdfDocument {
    // ── Construction ─────────────────────────────────────────────────────

    /// Parse the PDF at `path`.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let doc = Document::load(path).map_err(|e| PdfError::Load {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        debug!("Opened {} ({} pages)", path.display(), doc.get_pages().len());
        Ok(Self {
            doc,
            path: path.to_path_buf(),
        })
    }

    /// A document with an empty page tree, to be filled with [`append`](Self::append).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0_i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        Self {
            doc,
            path: path.into(),
        }
    }

    /// Wrap an in-memory `lopdf` document.
    pub fn from_lopdf(doc: Document, path: impl Into<PathBuf>) -> Self {
        Self {
            doc,
            path: path.into(),
        }
    }

    pub fn as_lopdf(&self) -> &Document {
        &self.doc
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Inspection ───────────────────────────────────────────────────────

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, PdfError> {
        self.doc
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page,
                total: self.page_count(),
            })
    }

    /// Width, height and stored rotation of a 1-indexed page.
    pub fn page_geometry(&self, page: u32) -> Result<PageGeometry, PdfError> {
        let page_id = self.page_id(page)?;
        let [x0, y0, x1, y1] = self.media_box(page_id)?;
        let (width, height) = (x1 - x0, y1 - y0);
        if width <= 0.0 || height <= 0.0 {
            return Err(PdfError::Structure(format!(
                "page {page} has an empty MediaBox ({width} x {height})"
            )));
        }
        let stored = match self.inherited(page_id, b"Rotate")? {
            Some(obj) => self.resolve(&obj)?.as_i64()?,
            None => 0,
        };
        let rotation = Rotation::from_page_rotate(stored).map_err(|_| {
            PdfError::Structure(format!("page {page} has /Rotate {stored}"))
        })?;
        Ok(PageGeometry::new(width, height, rotation))
    }

    /// `true` when the trailer carries an `/Encrypt` dictionary.
    pub fn is_protected(&self) -> bool {
        self.doc.trailer.has(b"Encrypt")
    }

    /// Drop the `/Encrypt` dictionary when `remove` is set, otherwise reject
    /// a protected document.
    pub fn ensure_unprotected(&mut self, remove: bool) -> Result<(), PdfError> {
        if !self.is_protected() {
            return Ok(());
        }
        if !remove {
            return Err(PdfError::PasswordProtected {
                path: self.path.clone(),
            });
        }
        self.doc.trailer.remove(b"Encrypt");
        debug!("Removed protection from {}", self.path.display());
        Ok(())
    }

    // ── Page placement ───────────────────────────────────────────────────

    /// Redraw a page's content through `matrix` onto a fresh `target`-sized page.
    ///
    /// The page keeps its object id and position in the page tree. Its stored
    /// `/Rotate`, secondary boxes and annotations are dropped.
    pub fn place_page(&mut self, page: u32, target: PageSize, matrix: Affine) -> Result<(), PdfError> {
        let page_id = self.page_id(page)?;
        let [x0, y0, x1, y1] = self.media_box(page_id)?;
        let content = self.page_content(page_id)?;
        let resources = self
            .inherited(page_id, b"Resources")?
            .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "FormType" => 1_i64,
                "BBox" => vec![real(x0), real(y0), real(x1), real(y1)],
                "Matrix" => matrix_object(&Affine::translate(-x0, -y0)),
                "Resources" => resources,
            },
            content,
        );
        let form_id = self.doc.add_object(form);

        let ops = format!("q {} cm /{} Do Q", format_matrix(&matrix), PAGE_XOBJECT);
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let page_dict = self.doc.get_dictionary_mut(page_id)?;
        page_dict.set(
            "MediaBox",
            vec![real(0.0), real(0.0), real(target.width), real(target.height)],
        );
        for key in SECONDARY_BOXES {
            page_dict.remove(key);
        }
        page_dict.remove(b"Annots");
        page_dict.set("Rotate", 0_i64);
        page_dict.set("Contents", content_id);
        page_dict.set(
            "Resources",
            dictionary! {
                "XObject" => dictionary! { PAGE_XOBJECT => form_id },
            },
        );
        Ok(())
    }

    // ── Page tree edits ──────────────────────────────────────────────────

    /// A new document holding pages `first..=last` (1-indexed, inclusive).
    pub fn extract_range(&self, first: u32, last: u32) -> Result<PdfDocument, PdfError> {
        let total = self.page_count();
        for page in [first, last] {
            if page == 0 || page > total {
                return Err(PdfError::PageOutOfRange { page, total });
            }
        }

        let mut part = self.clone();
        part.materialize_inherited()?;
        let pages = part.doc.get_pages();
        let keep: Vec<ObjectId> = (first..=last)
            .filter_map(|n| pages.get(&n).copied())
            .collect();

        let root = part.pages_root()?;
        for id in &keep {
            part.doc.get_dictionary_mut(*id)?.set("Parent", root);
        }
        let root_dict = part.doc.get_dictionary_mut(root)?;
        root_dict.set(
            "Kids",
            keep.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        );
        root_dict.set("Count", keep.len() as i64);

        // Outlines and open actions may point at pages that are gone.
        let catalog_id = part.catalog_id()?;
        let catalog = part.doc.get_dictionary_mut(catalog_id)?;
        catalog.remove(b"Outlines");
        catalog.remove(b"OpenAction");

        part.doc.prune_objects();
        Ok(part)
    }

    /// Append every page of `other` to the end of this document.
    ///
    /// Returns the number of pages appended.
    pub fn append(&mut self, other: PdfDocument) -> Result<u32, PdfError> {
        let mut other = other;
        other.materialize_inherited()?;
        let mut incoming = other.doc;
        incoming.renumber_objects_with(self.doc.max_id + 1);
        let pages: Vec<ObjectId> = incoming.get_pages().into_values().collect();
        self.doc.max_id = self.doc.max_id.max(incoming.max_id);

        for (id, object) in incoming.objects {
            match object.type_name().ok() {
                Some(b"Catalog" | b"Pages" | b"Outlines" | b"Outline") => {}
                _ => {
                    self.doc.objects.insert(id, object);
                }
            }
        }

        let root = self.pages_root()?;
        for id in &pages {
            self.doc.get_dictionary_mut(*id)?.set("Parent", root);
        }
        let root_dict = self.doc.get_dictionary_mut(root)?;
        let count = root_dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        let mut kids = match root_dict.get(b"Kids") {
            Ok(Object::Array(kids)) => kids.clone(),
            _ => Vec::new(),
        };
        kids.extend(pages.iter().map(|id| Object::Reference(*id)));
        root_dict.set("Kids", kids);
        root_dict.set("Count", count + pages.len() as i64);

        Ok(pages.len() as u32)
    }

    // ── Annotations ──────────────────────────────────────────────────────

    /// Add an invisible text annotation marking the start of a merged unit.
    ///
    /// Placed on page 1 with a zero-size rectangle; `title` becomes `/T` and
    /// `contents` becomes `/Contents`.
    pub fn add_break_annotation(&mut self, title: &str, contents: &str) -> Result<(), PdfError> {
        let first = self.page_id(1)?;
        let annot = self.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Text",
            "Rect" => vec![Object::Integer(0); 4],
            "T" => Object::string_literal(title),
            "Contents" => Object::string_literal(contents),
            "Open" => false,
        });
        self.push_annotation(first, annot)
    }

    fn push_annotation(&mut self, page_id: ObjectId, annot: ObjectId) -> Result<(), PdfError> {
        let existing = self.doc.get_dictionary(page_id)?.get(b"Annots").ok().cloned();
        match existing {
            Some(Object::Reference(array_id)) => {
                self.doc
                    .get_object_mut(array_id)?
                    .as_array_mut()?
                    .push(Object::Reference(annot));
            }
            Some(Object::Array(mut items)) => {
                items.push(Object::Reference(annot));
                self.doc.get_dictionary_mut(page_id)?.set("Annots", items);
            }
            _ => {
                self.doc
                    .get_dictionary_mut(page_id)?
                    .set("Annots", vec![Object::Reference(annot)]);
            }
        }
        Ok(())
    }

    /// Remove every page annotation and the document outline tree.
    ///
    /// Returns the number of annotations removed.
    pub fn strip_annotations_and_outlines(&mut self) -> Result<usize, PdfError> {
        let mut removed = 0;
        for page_id in self.doc.get_pages().into_values() {
            let annots = self.page_annotations(page_id)?;
            removed += annots.len();
            self.doc.get_dictionary_mut(page_id)?.remove(b"Annots");
        }
        let catalog_id = self.catalog_id()?;
        self.doc.get_dictionary_mut(catalog_id)?.remove(b"Outlines");
        debug!("Stripped {} annotations from {}", removed, self.path.display());
        Ok(removed)
    }

    /// Burn visible form-field widgets into page content and drop the form.
    ///
    /// Each widget's normal appearance stream is drawn at the widget's
    /// rectangle. Widgets without an appearance, or flagged hidden, vanish.
    /// Returns the number of widgets drawn.
    pub fn flatten_form_fields(&mut self) -> Result<usize, PdfError> {
        let mut drawn = 0;
        for page_id in self.doc.get_pages().into_values() {
            let mut kept = Vec::new();
            let mut draws: Vec<(ObjectId, Affine)> = Vec::new();
            let mut widgets = 0;

            for annot in self.page_annotations(page_id)? {
                let dict = self.resolve(&annot)?.as_dict().ok().cloned();
                let Some(dict) = dict else {
                    kept.push(annot);
                    continue;
                };
                if dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Widget".as_slice()) {
                    kept.push(annot);
                    continue;
                }
                widgets += 1;
                let flags = dict.get(b"F").and_then(Object::as_i64).unwrap_or(0);
                if flags & HIDDEN_FLAGS != 0 {
                    continue;
                }
                if let Some(placement) = self.widget_appearance(&dict)? {
                    draws.push(placement);
                }
            }

            if widgets == 0 {
                continue;
            }
            drawn += draws.len();
            self.draw_appearances(page_id, &draws)?;
            let page = self.doc.get_dictionary_mut(page_id)?;
            if kept.is_empty() {
                page.remove(b"Annots");
            } else {
                page.set("Annots", kept);
            }
        }

        let catalog_id = self.catalog_id()?;
        self.doc.get_dictionary_mut(catalog_id)?.remove(b"AcroForm");
        debug!("Flattened {} form widgets in {}", drawn, self.path.display());
        Ok(drawn)
    }

    /// Normal appearance stream of a widget and the matrix mapping its BBox to the widget Rect.
    fn widget_appearance(&self, widget: &Dictionary) -> Result<Option<(ObjectId, Affine)>, PdfError> {
        let Ok(ap) = widget.get(b"AP") else {
            return Ok(None);
        };
        let Ok(normal) = self.resolve(ap)?.as_dict().and_then(|ap| ap.get(b"N")) else {
            return Ok(None);
        };
        // /N is either the stream itself or a map of appearance states.
        let stream_ref = match normal {
            Object::Reference(id) if matches!(self.doc.get_object(*id), Ok(Object::Stream(_))) => *id,
            other => {
                let Ok(states) = self.resolve(other)?.as_dict() else {
                    return Ok(None);
                };
                let Ok(state) = widget.get(b"AS").and_then(Object::as_name) else {
                    return Ok(None);
                };
                match states.get(state) {
                    Ok(Object::Reference(id)) => *id,
                    _ => return Ok(None),
                }
            }
        };

        let Ok(rect) = widget.get(b"Rect") else {
            return Ok(None);
        };
        let [rx0, ry0, rx1, ry1] = self.rectangle(rect)?;
        let stream = self.doc.get_object(stream_ref)?.as_stream()?;
        let [bx0, by0, bx1, by1] = match stream.dict.get(b"BBox") {
            Ok(bbox) => self.rectangle(bbox)?,
            Err(_) => [0.0, 0.0, rx1 - rx0, ry1 - ry0],
        };
        let (bw, bh) = (bx1 - bx0, by1 - by0);
        let sx = if bw > 0.0 { (rx1 - rx0) / bw } else { 1.0 };
        let sy = if bh > 0.0 { (ry1 - ry0) / bh } else { 1.0 };
        let matrix = Affine {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: rx0 - bx0 * sx,
            f: ry0 - by0 * sy,
        };
        Ok(Some((stream_ref, matrix)))
    }

    /// Append `draws` to a page's content, registering each stream as an XObject.
    fn draw_appearances(&mut self, page_id: ObjectId, draws: &[(ObjectId, Affine)]) -> Result<(), PdfError> {
        if draws.is_empty() {
            return Ok(());
        }
        let mut resources = match self.inherited(page_id, b"Resources")? {
            Some(obj) => self.resolve(&obj)?.as_dict()?.clone(),
            None => Dictionary::new(),
        };
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => self.resolve(obj)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };

        let mut ops = String::from("Q\n");
        for (n, (stream_id, matrix)) in draws.iter().enumerate() {
            let name = format!("PdfJobFlat{n}");
            xobjects.set(name.as_str(), *stream_id);
            ops.push_str(&format!("q {} cm /{} Do Q\n", format_matrix(matrix), name));
        }
        resources.set("XObject", xobjects);

        let mut contents = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let open = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close = self.doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));
        contents.insert(0, Object::Reference(open));
        contents.push(Object::Reference(close));

        let page = self.doc.get_dictionary_mut(page_id)?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// Write the document to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), PdfError> {
        if self.page_count() == 0 {
            return Err(PdfError::NoPages);
        }
        self.doc.compress();
        self.doc
            .save(path)
            .map(|_| ())
            .map_err(|e| PdfError::Save {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
    }

    /// Size-optimising write: unreachable objects are pruned and the object
    /// table renumbered before streams are compressed.
    pub fn save_optimized(&mut self, path: &Path) -> Result<(), PdfError> {
        let pruned = self.doc.prune_objects();
        self.doc.renumber_objects();
        debug!("Pruned {} unreachable objects", pruned.len());
        self.save(path)
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn catalog_id(&self) -> Result<ObjectId, PdfError> {
        Ok(self.doc.trailer.get(b"Root")?.as_reference()?)
    }

    fn pages_root(&self) -> Result<ObjectId, PdfError> {
        let catalog = self.doc.get_dictionary(self.catalog_id()?)?;
        Ok(catalog.get(b"Pages")?.as_reference()?)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, PdfError> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Look up `key` on the page or its nearest ancestor.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>, PdfError> {
        let mut node = self.doc.get_dictionary(page_id)?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(value.clone()));
            }
            match node.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => node = self.doc.get_dictionary(parent)?,
                Err(_) => return Ok(None),
            }
        }
        Err(PdfError::Structure("page tree is too deep or cyclic".into()))
    }

    /// Copy inherited attributes onto every page.
    fn materialize_inherited(&mut self) -> Result<(), PdfError> {
        for page_id in self.doc.get_pages().into_values() {
            let mut missing = Vec::new();
            {
                let page = self.doc.get_dictionary(page_id)?;
                for key in INHERITABLE {
                    if !page.has(key) {
                        if let Some(value) = self.inherited(page_id, key)? {
                            missing.push((key, value));
                        }
                    }
                }
            }
            let page = self.doc.get_dictionary_mut(page_id)?;
            for (key, value) in missing {
                page.set(key.to_vec(), value);
            }
        }
        Ok(())
    }

    fn media_box(&self, page_id: ObjectId) -> Result<[f64; 4], PdfError> {
        match self.inherited(page_id, b"MediaBox")? {
            Some(obj) => self.rectangle(&obj),
            None => Err(PdfError::Structure("page has no MediaBox".into())),
        }
    }

    /// A normalised `[llx lly urx ury]` rectangle.
    fn rectangle(&self, obj: &Object) -> Result<[f64; 4], PdfError> {
        let items = self.resolve(obj)?.as_array()?;
        if items.len() != 4 {
            return Err(PdfError::Structure(format!(
                "rectangle has {} entries",
                items.len()
            )));
        }
        let mut v = [0.0; 4];
        for (slot, item) in v.iter_mut().zip(items) {
            *slot = self.number(item)?;
        }
        Ok([v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])])
    }

    fn number(&self, obj: &Object) -> Result<f64, PdfError> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(f64::from(*r)),
            other => Err(PdfError::Structure(format!(
                "expected a number, found {other:?}"
            ))),
        }
    }

    fn page_annotations(&self, page_id: ObjectId) -> Result<Vec<Object>, PdfError> {
        match self.doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(annots) => Ok(self.resolve(annots)?.as_array()?.clone()),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Decoded content of every content stream of a page, newline-joined.
    ///
    /// A filtered stream that fails to decode is an error: the raw bytes are
    /// meaningless once re-wrapped without their `/Filter`.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>, PdfError> {
        let mut content = Vec::new();
        for id in self.doc.get_page_contents(page_id) {
            let stream = self.doc.get_object(id)?.as_stream()?;
            let filtered = stream.dict.has(b"Filter") && !stream.filters()?.is_empty();
            let bytes = if filtered {
                stream.decompressed_content()?
            } else {
                stream.content.clone()
            };
            content.extend_from_slice(&bytes);
            content.push(b'\n');
        }
        Ok(content)
    }
}

// ── Number formatting ────────────────────────────────────────────────────

fn real(v: f64) -> Object {
    Object::Real(v as _)
}

fn matrix_object(m: &Affine) -> Vec<Object> {
    m.operands().iter().map(|v| real(*v)).collect()
}

/// Compact PDF number: integers without a fraction, otherwise up to 4 decimals.
fn format_number(v: f64) -> String {
    let rounded = (v * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    let s = format!("{rounded:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn format_matrix(m: &Affine) -> String {
    m.operands()
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<_>>()
        .join(" ")
}
