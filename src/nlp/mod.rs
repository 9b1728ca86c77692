pub mod rules;

use std::sync::LazyLock;

pub use rules::RuleModel;

static SHARED: LazyLock<RuleModel> = LazyLock::new(RuleModel::portuguese);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Date,
    Money,
    Org,
    Percent,
}

/// A typed span of the analysed text. `start` is a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub text: String,
    pub start: usize,
}

/// Sentence segmentation and named-entity recognition, consumed as a black box.
pub trait LinguisticModel: Send + Sync {
    /// Sentences in document order, trimmed, never empty.
    fn segment_sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;

    /// Entity spans ordered by their start offset.
    fn extract_entities(&self, text: &str) -> Vec<EntitySpan>;
}

/// Process-wide model, built on first use and only ever read.
pub fn shared() -> &'static RuleModel {
    &SHARED
}
