//! Vocabulary tables behind hover and completion.

use crate::validator::accessibility::expected_role;

/// `(property, one-line detail, long description)`
pub const SCHEMA_PROPERTIES: &[(&str, &str, &str)] = &[
    (
        "schema:accessMode",
        "A human sensory perceptual system needed for the content",
        "A human sensory perceptual system or cognitive faculty necessary to process or \
         perceive the content.\n\nValid values: `auditory`, `chartOnVisual`, `chemOnVisual`, \
         `colorDependent`, `diagramOnVisual`, `mathOnVisual`, `musicOnVisual`, `tactile`, \
         `textOnVisual`, `textual`, `visual`",
    ),
    (
        "schema:accessModeSufficient",
        "Access modes sufficient to understand the content",
        "A list of single or combined access modes that are sufficient to understand all the \
         intellectual content of a resource.\n\nValid values: comma-separated combinations of \
         `auditory`, `tactile`, `textual`, `visual`",
    ),
    (
        "schema:accessibilityFeature",
        "Accessibility features of the resource",
        "Content features of the resource, such as accessible media, alternatives and \
         supported enhancements for accessibility.\n\nCommon values: `alternativeText`, \
         `describedMath`, `displayTransformability`, `longDescription`, `MathML`, `none`, \
         `printPageNumbers`, `readingOrder`, `structuralNavigation`, `tableOfContents`",
    ),
    (
        "schema:accessibilityHazard",
        "Physiologically dangerous characteristics",
        "A characteristic of the described resource that is physiologically dangerous to \
         some users.\n\nValid values: `flashing`, `noFlashingHazard`, `motionSimulation`, \
         `noMotionSimulationHazard`, `sound`, `noSoundHazard`, `none`, `unknown`",
    ),
    (
        "schema:accessibilitySummary",
        "Human-readable accessibility summary",
        "A human-readable summary of specific accessibility features or deficiencies of the \
         publication.",
    ),
];

/// `(element, description)` for Dublin Core elements.
pub const DC_ELEMENTS: &[(&str, &str)] = &[
    ("title", "The title of the publication. Every EPUB must have at least one `dc:title`."),
    ("creator", "The name of a person or organization responsible for creating the content."),
    ("language", "The language of the publication content (BCP 47 tag, e.g. `en`, `fr`). Required."),
    ("identifier", "A unique identifier for the publication (e.g. ISBN, UUID). Required."),
    ("publisher", "The name of the entity responsible for making the publication available."),
    ("date", "The date of publication in the form YYYY or YYYY-MM-DD."),
    ("description", "A free-text description of the content of the publication."),
    ("rights", "A statement about rights held over the publication."),
    ("subject", "The topic or subject of the content."),
    ("contributor", "A person or organization that contributed to the content."),
    ("type", "The nature or genre of the content (e.g. `dictionary`, `annotation`)."),
    ("format", "The file format or physical medium of the publication."),
    ("source", "A related resource from which the publication is derived."),
    ("relation", "A related resource."),
    ("coverage", "The spatial or temporal coverage of the content."),
];

/// `(token, title, description)` for structural semantics.
pub const EPUB_TYPES: &[(&str, &str, &str)] = &[
    ("toc", "Table of Contents", "A navigation list of references to the content."),
    ("landmarks", "Landmarks", "A list of navigation links to key structural sections."),
    ("page-list", "Page List", "A list of references to static page break locations."),
    ("cover", "Cover", "The cover image of the publication."),
    ("titlepage", "Title Page", "A page at the beginning of the publication displaying the title."),
    ("frontmatter", "Front Matter", "Preliminary material to the main content, e.g. preface, dedication."),
    ("bodymatter", "Body Matter", "The main content of the publication."),
    ("backmatter", "Back Matter", "Closing material to the main content, e.g. appendices, glossary."),
    ("chapter", "Chapter", "A major structural division of a piece of writing."),
    ("part", "Part", "A major structural division of a piece of writing, larger than a chapter."),
    ("footnote", "Footnote", "Ancillary information placed at the bottom of a page."),
    ("endnote", "Endnote", "Ancillary information placed at the end of a work or section."),
    ("noteref", "Note Reference", "A reference to a footnote or endnote."),
    ("bibliography", "Bibliography", "A list of works cited."),
    ("glossary", "Glossary", "A collection of terms and their definitions."),
    ("index", "Index", "A navigational aid with references to content."),
    ("preface", "Preface", "An introductory section preceding the main body."),
    ("foreword", "Foreword", "An introductory section usually by someone other than the author."),
    ("appendix", "Appendix", "Supplementary material at the end of the main content."),
    ("dedication", "Dedication", "An inscription addressed to one or more persons."),
    ("epigraph", "Epigraph", "A quotation set at the beginning of a work or section."),
    ("abstract", "Abstract", "A short summary of the work."),
    ("colophon", "Colophon", "A brief description of publishing details."),
    ("pagebreak", "Page Break", "A location representing a page break from a static page source."),
];

/// Media types offered for `item@media-type`.
pub const MEDIA_TYPES: &[&str] = &[
    "application/xhtml+xml",
    "application/x-dtbncx+xml",
    "text/css",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/svg+xml",
    "image/webp",
    "application/javascript",
    "audio/mpeg",
    "audio/mp4",
    "video/mp4",
    "application/font-woff",
    "application/font-sfnt",
    "font/otf",
    "font/ttf",
    "font/woff",
    "font/woff2",
];

fn role_for(token: &str) -> Option<&'static str> {
    match token {
        "landmarks" => Some("directory"),
        _ => expected_role(token),
    }
}

pub fn schema_property(property: &str) -> Option<String> {
    SCHEMA_PROPERTIES
        .iter()
        .find(|(name, ..)| *name == property)
        .map(|(name, _, doc)| format!("**{name}**\n\n{doc}"))
}

pub fn dc_element(local: &str) -> Option<String> {
    DC_ELEMENTS
        .iter()
        .find(|(name, _)| *name == local)
        .map(|(name, doc)| format!("**dc:{name}**\n\n{doc}"))
}

pub fn epub_type(token: &str) -> Option<String> {
    let (name, title, doc) = EPUB_TYPES.iter().find(|(name, ..)| *name == token)?;
    let mut text = format!("**{name}** ({title})\n\n");
    if let Some(role) = role_for(name) {
        text.push_str(&format!("Expected ARIA role: `{role}`\n\n"));
    }
    text.push_str(doc);
    Some(text)
}

/// Documentation for the first documented token of an `epub:type` list.
pub fn epub_type_list(value: &str) -> Option<String> {
    value.split_ascii_whitespace().find_map(epub_type)
}
