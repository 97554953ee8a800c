//! Document handle.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::error::CapabilityError;
use crate::parser::layout::DocumentLayout;

/// A borrowed handle to the PDF bytes of one extraction request.
///
/// The caller owns the bytes for the duration of the request; nothing in the
/// pipeline mutates them. When a capability asked for file-backed access the
/// handle also carries the path of the request's scratch copy.
///
/// Parsed page layout is memoized on the handle so that the native-text and
/// table capabilities share one pass over the content streams. The memo lives
/// and dies with the request.
#[derive(Debug)]
pub struct Document<'a> {
    bytes: &'a [u8],
    path: Option<&'a Path>,
    layout: OnceLock<Result<Arc<DocumentLayout>, CapabilityError>>,
}

impl<'a> Document<'a> {
    /// Create a handle over in-memory PDF bytes.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            path: None,
            layout: OnceLock::new(),
        }
    }

    /// Attach the path of a file holding the same bytes.
    pub fn with_path(mut self, path: &'a Path) -> Self {
        self.path = Some(path);
        self
    }

    /// Raw PDF bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Path of the materialized copy, if the request created one.
    pub fn path(&self) -> Option<&'a Path> {
        self.path
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the document has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Return the memoized layout, computing it with `init` on first use.
    ///
    /// A failed parse is memoized too: every later caller sees the same
    /// document-level error instead of re-parsing.
    pub fn layout_or_init<F>(&self, init: F) -> Result<Arc<DocumentLayout>, CapabilityError>
    where
        F: FnOnce(&[u8]) -> Result<DocumentLayout, CapabilityError>,
    {
        self.layout
            .get_or_init(|| init(self.bytes).map(Arc::new))
            .clone()
    }
}
