//! Document reducer passes
//!
//! Both passes walk owned child vectors with an explicit stack, so no parent
//! back-references are needed. They are best-effort: a subtree nested deeper
//! than the configured limit is left untouched, reported, and the pass moves
//! on to the remaining nodes.

use crate::config::ReducerConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::xmltv::document::{Element, Node, PROGRAMME_TAG};

const STRIP_PASS: &str = "description stripping";

/// Applies the description and basic-mode passes with one configuration
#[derive(Debug, Clone)]
pub struct Reducer {
    description_tag: String,
    keep_tag: String,
    max_depth: usize,
}

impl Reducer {
    pub fn new(config: &ReducerConfig) -> Self {
        Self {
            description_tag: config.description_tag.clone(),
            keep_tag: config.basic_keep_tag.clone(),
            max_depth: config.max_depth,
        }
    }

    /// Remove every descendant element named after the description tag
    ///
    /// Returns the number of removed elements. Sibling order of everything
    /// that remains is preserved.
    pub fn strip_descriptions(&self, root: &mut Element, diagnostics: &mut Diagnostics) -> usize {
        let tag = self.description_tag.as_str();
        let mut removed = 0;
        let mut stack: Vec<(&mut Element, usize)> = vec![(root, 0)];

        while let Some((element, depth)) = stack.pop() {
            let before = element.children.len();
            element
                .children
                .retain(|node| !matches!(node, Node::Element(child) if child.is(tag)));
            removed += before - element.children.len();

            for node in element.children.iter_mut() {
                let Node::Element(child) = node else {
                    continue;
                };
                if child.children.is_empty() {
                    continue;
                }
                if depth + 1 >= self.max_depth {
                    diagnostics.warn(Warning::SubtreeSkipped {
                        pass: STRIP_PASS,
                        element: child.name.clone(),
                        depth: depth + 1,
                    });
                    continue;
                }
                stack.push((child, depth + 1));
            }
        }
        removed
    }

    /// Keep only the title children of a programme; other elements are left alone
    ///
    /// Attributes are untouched. Returns the number of removed children, so a
    /// second application returns 0.
    pub fn reduce_to_basic(&self, element: &mut Element) -> usize {
        if !element.is(PROGRAMME_TAG) {
            return 0;
        }
        let keep = self.keep_tag.as_str();
        let before = element.children.len();
        element
            .children
            .retain(|node| matches!(node, Node::Element(child) if child.is(keep)));
        before - element.children.len()
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(&ReducerConfig::default())
    }
}
