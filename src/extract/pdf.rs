//! Style feature extraction from PDF samples.
//!
//! PDFs are read-only style evidence: each shown text fragment contributes
//! one body sample keyed by its normalized base font and size. Heading and
//! page-level detection is not attempted for PDF.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::infer::mode::round2;
use crate::model::StyleAttrs;
use crate::text::strip_subset_prefix;

use super::{summarize_samples, Features};

/// Extract body-style features from a PDF sample.
///
/// A PDF yielding no text-showing operation at all (a scan, typically) is a
/// hard failure: there is nothing to learn from it and the caller should
/// ask for OCR output or a DOCX instead.
pub fn extract_pdf_features(data: &[u8]) -> Result<Features> {
    let doc = Document::load_mem(data)?;
    if doc.is_encrypted() {
        return Err(Error::Encrypted);
    }

    let mut samples: Vec<StyleAttrs> = Vec::new();
    for (_page_num, page_id) in doc.get_pages() {
        let fonts = page_fonts(&doc, page_id);
        walk_page_text(&doc, page_id, &fonts, &mut |font: Option<&str>, size_pt: f64| {
            samples.push(StyleAttrs {
                font_family: font.map(str::to_string),
                font_size_pt: Some(round2(size_pt)),
                ..Default::default()
            });
        })?;
    }

    if samples.is_empty() {
        return Err(Error::TextlessPdf);
    }

    Ok(Features {
        body: summarize_samples(&samples),
        ..Default::default()
    })
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object.as_reference() {
        Ok(id) => doc.get_object(id).unwrap_or(object),
        Err(_) => object,
    }
}

/// Font-resource map of one page: resource name → normalized base font.
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, String> {
    let mut fonts = HashMap::new();
    let (direct, inherited) = match doc.get_page_resources(page_id) {
        Ok(res) => res,
        Err(_) => return fonts,
    };

    let mut dicts: Vec<&Dictionary> = Vec::new();
    if let Some(dict) = direct {
        dicts.push(dict);
    }
    for id in inherited {
        if let Ok(dict) = doc.get_dictionary(id) {
            dicts.push(dict);
        }
    }

    for resources in dicts {
        let Ok(font_entry) = resources.get(b"Font") else {
            continue;
        };
        let Ok(font_dict) = resolve(doc, font_entry).as_dict() else {
            continue;
        };
        for (name, value) in font_dict.iter() {
            let Ok(font) = resolve(doc, value).as_dict() else {
                continue;
            };
            let Ok(base_font) = font.get(b"BaseFont").and_then(Object::as_name) else {
                continue;
            };
            let base = String::from_utf8_lossy(base_font);
            fonts.insert(
                name.clone(),
                strip_subset_prefix(&base).to_string(),
            );
        }
    }

    fonts
}

/// Walk one page's content stream, invoking the visitor for every
/// text-showing operation that carries visible bytes. The current font and
/// size follow `Tf` as the stream runs.
fn walk_page_text(
    doc: &Document,
    page_id: ObjectId,
    fonts: &HashMap<Vec<u8>, String>,
    visit: &mut impl FnMut(Option<&str>, f64),
) -> Result<()> {
    let content_data = doc.get_page_content(page_id)?;
    let content = Content::decode(&content_data)?;

    let mut font: Option<&str> = None;
    let mut size_pt = 0.0f64;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok()) {
                    font = fonts.get(name).map(String::as_str);
                }
                if let Some(size) = operation.operands.get(1).and_then(|o| o.as_float().ok()) {
                    size_pt = size as f64;
                }
            }
            "Tj" | "'" => {
                if let Some(Object::String(bytes, _)) = operation.operands.last() {
                    if !bytes.is_empty() {
                        visit(font, size_pt);
                    }
                }
            }
            "\"" => {
                if let Some(Object::String(bytes, _)) = operation.operands.get(2) {
                    if !bytes.is_empty() {
                        visit(font, size_pt);
                    }
                }
            }
            "TJ" => {
                let shown = operation
                    .operands
                    .first()
                    .and_then(|o| o.as_array().ok())
                    .map(|parts| {
                        parts.iter().any(|p| matches!(p, Object::String(b, _) if !b.is_empty()))
                    })
                    .unwrap_or(false);
                if shown {
                    visit(font, size_pt);
                }
            }
            _ => {}
        }
    }

    Ok(())
}
