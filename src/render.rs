use serde_json::{json, Value};

use crate::analysis::Analysis;
use crate::error::GenerationError;
use crate::pipeline::Report;

pub fn signals_panel(analysis: &Analysis) -> String {
    let entities = serde_json::to_string_pretty(&analysis.entities).unwrap_or_default();
    let categories = if analysis.categories.is_empty() {
        "(nenhuma)".to_string()
    } else {
        analysis
            .categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let sentences = if analysis.key_sentences.is_empty() {
        "  (nenhum)\n".to_string()
    } else {
        analysis
            .key_sentences
            .iter()
            .map(|s| format!("  - {}\n", s))
            .collect()
    };

    format!(
        "#### Análise Técnica\nEntidades identificadas:\n{}\n\nCategorias: {}\n\nTrechos relevantes:\n{}",
        entities, categories, sentences
    )
}

pub fn answer_panel(answer: &Result<String, GenerationError>) -> String {
    match answer {
        Ok(text) => format!("#### Resposta ao Prompt\n{}\n", text.trim_end()),
        Err(e) => format!(
            "#### Resposta ao Prompt\nNão foi possível gerar a análise: {}\n",
            e
        ),
    }
}

pub fn signals_json(url: &str, analysis: &Analysis) -> Value {
    json!({
        "url": url,
        "entities": analysis.entities,
        "categories": analysis.categories,
        "key_sentences": analysis.key_sentences,
    })
}

pub fn report_json(report: &Report) -> Value {
    let mut doc = signals_json(&report.page.url, &report.analysis);
    doc["instruction"] = json!(report.instruction);
    doc["html_bytes"] = json!(report.page.raw_html.len());
    doc["model"] = json!(report.model);
    doc["analyzed_at"] = json!(report.analyzed_at.to_rfc3339());
    match &report.answer {
        Ok(text) => {
            doc["answer"] = json!(text);
            doc["error"] = Value::Null;
        }
        Err(e) => {
            doc["answer"] = Value::Null;
            doc["error"] = json!(e.to_string());
        }
    }
    doc
}

// ── Tests ──
