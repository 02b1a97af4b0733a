//! In-memory PDFs for tests.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub(crate) struct FixturePage<'a> {
    /// Raw content stream. `/F1` is Helvetica, `/F2` is Helvetica-Bold.
    pub content: &'a str,
    /// `/Link` annotation rectangles in user space.
    pub links: &'a [[i64; 4]],
}

pub(crate) struct FixtureOutline<'a> {
    pub title: &'a str,
    /// 0-based index into the fixture's pages.
    pub page: usize,
    pub children: &'a [FixtureOutline<'a>],
}

/// A US Letter document with the given pages and outline.
pub(crate) fn build_pdf(pages: &[FixturePage<'_>], outline: &[FixtureOutline<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.content.as_bytes().to_vec()));
        let annots: Vec<Object> = page
            .links
            .iter()
            .map(|rect| {
                let rect: Vec<Object> = rect.iter().map(|&v| Object::Integer(v)).collect();
                doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => rect,
                })
                .into()
            })
            .collect();
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => regular, "F2" => bold },
            },
            "Annots" => annots,
        }));
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };
    if !outline.is_empty() {
        let outlines_id = doc.new_object_id();
        let (first, last) = add_outline_level(&mut doc, outline, outlines_id, &page_ids);
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! { "Type" => "Outlines", "First" => first, "Last" => last }),
        );
        catalog.set("Outlines", outlines_id);
    }

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Fixture"),
        "Author" => Object::string_literal("QA"),
    });
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn add_outline_level(
    doc: &mut Document,
    items: &[FixtureOutline<'_>],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (ObjectId, ObjectId) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();
    for (i, item) in items.iter().enumerate() {
        let mut dict: Dictionary = dictionary! {
            "Title" => Object::string_literal(item.title),
            "Parent" => parent,
            "Dest" => vec![page_ids[item.page].into(), "Fit".into()],
        };
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }
        if !item.children.is_empty() {
            let (first, last) = add_outline_level(doc, item.children, ids[i], page_ids);
            dict.set("First", first);
            dict.set("Last", last);
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }
    (ids[0], ids[ids.len() - 1])
}
