//! In-memory citation tree built from quick-xml events.
//!
//! Citation fragments are small, so each one is materialized as a tree and
//! queried with slash-separated child paths (`AuthorList/Author/LastName`),
//! relative to the element the query starts from.

use crate::fault::FieldFault;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text before the first child element, `None` when there is none.
    pub fn text(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// All descendants reached by following `path` one child level per segment,
    /// in document order. `.` and empty segments are ignored.
    pub fn find_all<'a>(&'a self, path: &str) -> Vec<&'a Element> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter().filter(move |c| c.name == segment))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// Text of every element matching `path`; elements without text yield `""`.
    pub fn texts(&self, path: &str) -> Vec<String> {
        self.find_all(path)
            .into_iter()
            .map(|el| el.text().unwrap_or_default().to_string())
            .collect()
    }
}

/// A parsed citation fragment.
#[derive(Debug, Clone)]
pub struct CitationTree {
    root: Element,
}

impl CitationTree {
    pub fn parse(xml: &str) -> Result<Self, FieldFault> {
        let mut reader = Reader::from_str(xml);
        reader.check_end_names(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                FieldFault::InvalidXml(format!("{} at byte {}", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(e) => stack.push(Element::new(e.name().as_ref())),
                Event::Empty(e) => attach(&mut stack, &mut root, Element::new(e.name().as_ref()))?,
                Event::End(_) => {
                    let closed = stack
                        .pop()
                        .ok_or_else(|| FieldFault::InvalidXml("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, closed)?;
                }
                Event::Text(e) => {
                    // Unknown entities are kept verbatim rather than failing the record.
                    let text = match e.unescape() {
                        Ok(t) => t.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FieldFault::InvalidXml(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| FieldFault::InvalidXml("no root element".into()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FieldFault> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(FieldFault::InvalidXml(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), FieldFault> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        // Tail text after a child belongs to that child, not the parent
        Some(el) if !el.children.is_empty() => Ok(()),
        Some(el) => {
            el.text.push_str(text);
            Ok(())
        }
        None => Err(FieldFault::InvalidXml("text outside root element".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<?xml version='1.0'?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status='MEDLINE'>
      <Article>
        <AuthorList>
          <Author><LastName>Doe</LastName><ForeName>John</ForeName></Author>
          <Author><LastName>Roe</LastName><ForeName>Jane</ForeName></Author>
        </AuthorList>
      </Article>
      <MeshHeadingList>
        <MeshHeading><DescriptorName UI='D1'>Humans</DescriptorName></MeshHeading>
        <MeshHeading><DescriptorName UI='D2'/></MeshHeading>
      </MeshHeadingList>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>";

    #[test]
    fn parses_nested_elements() {
        let tree = CitationTree::parse(SAMPLE).unwrap();
        assert_eq!(tree.root().name(), "PubmedArticleSet");
        assert_eq!(tree.root().children().len(), 1);
    }

    #[test]
    fn find_all_follows_paths_in_document_order() {
        let tree = CitationTree::parse(SAMPLE).unwrap();
        let citation = tree.root().find("./PubmedArticle/MedlineCitation").unwrap();
        assert_eq!(
            citation.texts("Article/AuthorList/Author/LastName"),
            vec!["Doe", "Roe"]
        );
    }

    #[test]
    fn empty_elements_have_no_text() {
        let tree = CitationTree::parse(SAMPLE).unwrap();
        let names = tree
            .root()
            .find_all("PubmedArticle/MedlineCitation/MeshHeadingList/MeshHeading/DescriptorName");
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].text(), Some("Humans"));
        assert_eq!(names[1].text(), None);
    }

    #[test]
    fn missing_path_is_empty() {
        let tree = CitationTree::parse(SAMPLE).unwrap();
        assert!(tree.root().find_all("PubmedBookArticle/BookDocument").is_empty());
        assert!(tree.root().find("Nope").is_none());
    }

    #[test]
    fn entities_are_unescaped() {
        let tree = CitationTree::parse("<a><b>Smith &amp; Sons</b></a>").unwrap();
        assert_eq!(tree.root().texts("b"), vec!["Smith & Sons"]);
    }

    #[test]
    fn unknown_entity_kept_verbatim() {
        let tree = CitationTree::parse("<a><b>x&nbsp;y</b></a>").unwrap();
        assert_eq!(tree.root().texts("b"), vec!["x&nbsp;y"]);
    }

    #[test]
    fn text_after_child_is_not_element_text() {
        let tree = CitationTree::parse("<a><b>A<i>x</i>C</b></a>").unwrap();
        assert_eq!(tree.root().texts("b"), vec!["A"]);
        assert_eq!(tree.root().texts("b/i"), vec!["x"]);

        let tail_only = CitationTree::parse("<a><b><i>x</i>C</b></a>").unwrap();
        assert_eq!(tail_only.root().find("b").and_then(Element::text), None);
    }

    #[test]
    fn mismatched_tags_are_invalid() {
        assert!(matches!(
            CitationTree::parse("<a><b></a></b>"),
            Err(FieldFault::InvalidXml(_))
        ));
    }

    #[test]
    fn unclosed_root_is_invalid() {
        assert!(matches!(
            CitationTree::parse("<a><b>text</b>"),
            Err(FieldFault::InvalidXml(_))
        ));
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(matches!(
            CitationTree::parse("   "),
            Err(FieldFault::InvalidXml(_))
        ));
    }
}
