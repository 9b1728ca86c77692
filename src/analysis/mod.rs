pub mod keywords;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::nlp::{EntityLabel, LinguisticModel};
use crate::utils::truncate_chars;
pub use keywords::KeywordRules;

/// Analysis input is silently cut to this many characters.
pub const MAX_ANALYSIS_CHARS: usize = 1_000_000;

/// Entity buckets in order of appearance. Repeated mentions are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityBundle {
    #[serde(rename = "datas")]
    pub dates: Vec<String>,
    #[serde(rename = "valores")]
    pub monetary_amounts: Vec<String>,
    #[serde(rename = "organizacoes")]
    pub organizations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub entities: EntityBundle,
    pub key_sentences: Vec<String>,
    pub categories: BTreeSet<String>,
}

pub struct Extractor<'m> {
    model: &'m dyn LinguisticModel,
    rules: KeywordRules,
}

impl<'m> Extractor<'m> {
    pub fn new(model: &'m dyn LinguisticModel, rules: KeywordRules) -> Self {
        Extractor { model, rules }
    }

    pub fn analyze(&self, text: &str) -> Analysis {
        let text = truncate_chars(text, MAX_ANALYSIS_CHARS);

        let entities = self.bucket_entities(text);
        let key_sentences: Vec<String> = self
            .model
            .segment_sentences(text)
            .into_iter()
            .filter(|s| self.rules.is_key_sentence(s))
            .map(|s| s.trim().to_string())
            .collect();
        let categories = self.rules.categorize(&text.to_lowercase());

        debug!(
            dates = entities.dates.len(),
            amounts = entities.monetary_amounts.len(),
            orgs = entities.organizations.len(),
            key_sentences = key_sentences.len(),
            categories = categories.len(),
            "Analysis complete"
        );

        Analysis {
            entities,
            key_sentences,
            categories,
        }
    }

    fn bucket_entities(&self, text: &str) -> EntityBundle {
        let mut bundle = EntityBundle::default();
        for span in self.model.extract_entities(text) {
            match span.label {
                EntityLabel::Date => bundle.dates.push(span.text),
                EntityLabel::Money => bundle.monetary_amounts.push(span.text),
                EntityLabel::Org => bundle.organizations.push(span.text),
                EntityLabel::Percent => {}
            }
        }
        bundle
    }
}

// ── Tests ──
