use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;

const KEY_TERMS: &[&str] = &[
    "objetivo",
    "prazo",
    "recurso",
    "financiamento",
    "contrapartida",
    "elegível",
    "requisito",
    "valor",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Tecnologia", &["tecnologia", "inovação", "digital", "software"]),
    ("Saúde", &["saúde", "médico", "hospital", "clínico"]),
    ("Educação", &["educação", "ensino", "escola", "acadêmico"]),
    ("Meio Ambiente", &["sustentável", "ambiental", "ecológico"]),
    ("Infraestrutura", &["infraestrutura", "construção", "obra"]),
];

/// Keyword configuration: which words make a sentence "key" and which words
/// put the text in a thematic category. Matching is lowercase substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    pub key_terms: Vec<String>,
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        KeywordRules {
            key_terms: KEY_TERMS.iter().map(|t| t.to_string()).collect(),
            categories: CATEGORIES
                .iter()
                .map(|(label, words)| {
                    (label.to_string(), words.iter().map(|w| w.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl KeywordRules {
    pub fn from_json_file(path: &Path) -> Result<Self, RulesError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and normalise: keywords are trimmed and lowercased, empty ones rejected.
    pub fn from_json(raw: &str) -> Result<Self, RulesError> {
        let rules: KeywordRules = serde_json::from_str(raw)?;
        rules.normalized()
    }

    fn normalized(self) -> Result<Self, RulesError> {
        let key_terms = normalize_list("key_terms", self.key_terms)?;
        let categories: BTreeMap<String, Vec<String>> = self
            .categories
            .into_iter()
            .map(|(label, words)| normalize_list(&label, words).map(|words| (label, words)))
            .collect::<Result<_, RulesError>>()?;
        Ok(KeywordRules {
            key_terms,
            categories,
        })
    }

    pub fn is_key_sentence(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        self.key_terms.iter().any(|t| lower.contains(t.as_str()))
    }

    /// Labels whose keyword list hits the already-lowercased text.
    pub fn categorize(&self, lower_text: &str) -> BTreeSet<String> {
        self.categories
            .iter()
            .filter(|(_, words)| words.iter().any(|w| lower_text.contains(w.as_str())))
            .map(|(label, _)| label.clone())
            .collect()
    }
}

fn normalize_list(owner: &str, words: Vec<String>) -> Result<Vec<String>, RulesError> {
    words
        .into_iter()
        .map(|w| {
            let w = w.trim().to_lowercase();
            if w.is_empty() {
                Err(RulesError::EmptyKeyword(owner.to_string()))
            } else {
                Ok(w)
            }
        })
        .collect()
}
