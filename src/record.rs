use std::sync::Arc;

use serde_json::{Map, Value};

/// Opaque binary-like payload attached to an item. Kept behind an `Arc` so
/// copying an item into its output record never duplicates attachment bytes.
pub type Attachment = Map<String, Value>;

/// One element of the ordered input batch.
#[derive(Debug, Clone, Default)]
pub struct InputItem {
    /// Arbitrary payload. Must be a JSON object for the item to be enrichable.
    pub data: Value,
    pub attachment: Option<Arc<Attachment>>,
}

impl InputItem {
    pub fn new(data: Value) -> Self {
        Self { data, attachment: None }
    }

    pub fn with_attachment(data: Value, attachment: Attachment) -> Self {
        Self {
            data,
            attachment: Some(Arc::new(attachment)),
        }
    }
}

/// An enriched item: a deep copy of the input's `data` with the token field
/// merged in, the attachment shared with the input, and the source position.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub data: Value,
    pub attachment: Option<Arc<Attachment>>,
    pub index: usize,
}

/// One output slot per input item, index-aligned with the input batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    Enriched(OutputRecord),
    /// Stand-in emitted under continue-on-fail when building one item failed.
    Failed { index: usize, message: String },
}

impl BatchItem {
    /// Position tag of the source item, regardless of outcome.
    pub fn index(&self) -> usize {
        match self {
            BatchItem::Enriched(record) => record.index,
            BatchItem::Failed { index, .. } => *index,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, BatchItem::Enriched(_))
    }
}

/// Batch runtime context supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub items: Vec<InputItem>,
    /// When set, a failing item becomes a `BatchItem::Failed` slot instead of
    /// aborting the batch.
    pub continue_on_fail: bool,
}

impl ExecutionContext {
    pub fn new(items: Vec<InputItem>) -> Self {
        Self { items, continue_on_fail: false }
    }

    pub fn continue_on_fail(mut self) -> Self {
        self.continue_on_fail = true;
        self
    }
}
