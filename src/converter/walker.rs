use crate::converter::document::{Document, Element};

/// Lazily yields the notebook cells of a document in document order.
///
/// A cell is a `div` whose class list has a token containing one of the
/// markers. Only outermost matches are yielded. When nothing matches, the
/// body (or the root when there is no body) is yielded as the single cell.
pub struct CellWalker<'a> {
    markers: &'a [String],
    stack: Vec<&'a Element>,
    fallback: Option<&'a Element>,
    found: bool,
}

impl<'a> CellWalker<'a> {
    pub fn new(document: &'a Document, markers: &'a [String]) -> Self {
        Self {
            markers,
            stack: vec![document.root()],
            fallback: Some(document.body().unwrap_or(document.root())),
            found: false,
        }
    }

    fn is_cell(&self, element: &Element) -> bool {
        element.tag() == "div"
            && element
                .classes()
                .any(|class| self.markers.iter().any(|marker| class.contains(marker.as_str())))
    }
}

impl<'a> Iterator for CellWalker<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.stack.pop() {
            if self.is_cell(element) {
                self.found = true;
                return Some(element);
            }
            let start = self.stack.len();
            self.stack.extend(element.child_elements());
            self.stack[start..].reverse();
        }

        if self.found {
            return None;
        }
        let fallback = self.fallback.take();
        if fallback.is_some() {
            tracing::debug!("no notebook cells found, using the whole body");
        }
        fallback
    }
}
