pub mod templates;

use std::collections::BTreeSet;

use crate::analysis::EntityBundle;
use crate::fetcher::FetchedPage;
use crate::utils::truncate_chars;

pub use templates::{PromptTemplate, PRESETS};

/// Page text sent to the model is silently cut to this many characters.
pub const MAX_PROMPT_TEXT_CHARS: usize = 2_000;

/// Marker the model must use for requested facts it cannot find.
pub const NOT_FOUND_MARKER: &str = "Não encontrado";

/// Build the generation prompt. Pure: the same inputs always give the same string.
pub fn compose(
    user_prompt: &str,
    page: &FetchedPage,
    entities: &EntityBundle,
    categories: &BTreeSet<String>,
) -> String {
    let content = truncate_chars(&page.plain_text, MAX_PROMPT_TEXT_CHARS);
    let entities_json = serde_json::to_string_pretty(entities).unwrap_or_default();
    let categories_json = serde_json::to_string_pretty(categories).unwrap_or_default();

    format!(
        "Com base no seguinte prompt do usuário:\n\
         {user_prompt}\n\
         \n\
         Analise o seguinte conteúdo e forneça uma resposta estruturada que atenda especificamente à solicitação do usuário.\n\
         Se alguma informação solicitada não for encontrada, indique explicitamente como \"{NOT_FOUND_MARKER}\".\n\
         \n\
         Conteúdo para análise:\n\
         {content}\n\
         \n\
         Entidades relevantes identificadas:\n\
         {entities_json}\n\
         \n\
         Categorias identificadas:\n\
         {categories_json}\n"
    )
}

// ── Tests ──
