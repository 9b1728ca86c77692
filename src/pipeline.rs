use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::analysis::{Analysis, Extractor, KeywordRules};
use crate::config::Settings;
use crate::error::{FetchError, GenerationError, PipelineError};
use crate::fetcher::{FetchedPage, Fetcher};
use crate::generator::Generator;
use crate::nlp::LinguisticModel;
use crate::prompt;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+|www\.[^\s<>"]+"#).unwrap());

/// Linear request lifecycle. No stage is ever revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Composing,
    Requesting,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Stage::Fetching => "Buscando página...",
            Stage::Extracting => "Extraindo entidades e categorias...",
            Stage::Composing => "Montando prompt...",
            Stage::Requesting => "Consultando o modelo...",
            Stage::Done => "Concluído",
            Stage::Failed => "Falhou",
        };
        f.write_str(msg)
    }
}

/// Everything one successful fetch produced, plus the model's answer or why
/// there is none.
#[derive(Debug)]
pub struct Report {
    pub instruction: String,
    pub page: FetchedPage,
    pub analysis: Analysis,
    pub prompt: String,
    pub model: String,
    pub answer: Result<String, GenerationError>,
    pub analyzed_at: DateTime<Utc>,
}

impl Report {
    pub fn final_stage(&self) -> Stage {
        if self.answer.is_ok() {
            Stage::Done
        } else {
            Stage::Failed
        }
    }
}

/// First URL in the instruction text. Trailing sentence punctuation is dropped,
/// a closing parenthesis only when it has no opening partner in the URL, and
/// bare `www.` hosts get an https scheme.
pub fn find_url(instruction: &str) -> Option<String> {
    let m = URL_RE.find(instruction)?;
    let mut url = m.as_str();
    while let Some(last) = url.chars().last() {
        let unbalanced_paren =
            last == ')' && url.matches(')').count() > url.matches('(').count();
        if matches!(last, '.' | ',' | ';' | ':' | '!' | '?') || unbalanced_paren {
            url = &url[..url.len() - 1];
        } else {
            break;
        }
    }
    if url.starts_with("www.") {
        Some(format!("https://{}", url))
    } else {
        Some(url.to_string())
    }
}

pub struct Pipeline<'m> {
    fetcher: Fetcher,
    extractor: Extractor<'m>,
    generator: Generator,
}

impl<'m> Pipeline<'m> {
    pub fn new(
        settings: &Settings,
        model: &'m dyn LinguisticModel,
        rules: KeywordRules,
    ) -> anyhow::Result<Self> {
        Ok(Pipeline {
            fetcher: Fetcher::new(settings)?,
            extractor: Extractor::new(model, rules),
            generator: Generator::new(settings)?,
        })
    }

    /// Fetching → Extracting. A fetch failure ends the request.
    pub async fn extract<F: FnMut(Stage)>(
        &self,
        url: &str,
        on_stage: &mut F,
    ) -> Result<(FetchedPage, Analysis), FetchError> {
        on_stage(Stage::Fetching);
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                on_stage(Stage::Failed);
                return Err(e);
            }
        };

        on_stage(Stage::Extracting);
        let analysis = self.extractor.analyze(&page.plain_text);
        info!(
            url,
            key_sentences = analysis.key_sentences.len(),
            categories = analysis.categories.len(),
            "Extracted signals"
        );
        Ok((page, analysis))
    }

    /// Full run. Errors before extraction abort; a generation failure is
    /// carried in the report so the extracted signals can still be shown.
    pub async fn run<F: FnMut(Stage)>(
        &self,
        instruction: &str,
        mut on_stage: F,
    ) -> Result<Report, PipelineError> {
        let Some(url) = find_url(instruction) else {
            on_stage(Stage::Failed);
            return Err(PipelineError::NoUrlFound);
        };
        info!(url = %url, "Found URL in instruction");

        let (page, analysis) = self.extract(&url, &mut on_stage).await?;

        on_stage(Stage::Composing);
        let prompt = prompt::compose(instruction, &page, &analysis.entities, &analysis.categories);

        on_stage(Stage::Requesting);
        let answer = self.generator.generate(&prompt).await;
        match &answer {
            Ok(_) => on_stage(Stage::Done),
            Err(e) => {
                warn!(model = self.generator.model(), error = %e, "Generation failed");
                on_stage(Stage::Failed);
            }
        }

        Ok(Report {
            instruction: instruction.to_string(),
            page,
            analysis,
            prompt,
            model: self.generator.model().to_string(),
            answer,
            analyzed_at: Utc::now(),
        })
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp;
    use crate::testutil::{unreachable_url, Responder};

    const EDITAL_PAGE: &str = "<html><body>\
        <nav>Menu</nav>\
        <h1>Chamada 01/2024</h1>\
        <p>Inscrições abertas para pesquisadores.</p>\
        <p>O prazo de 30 dias conta da publicação.</p>\
        </body></html>";

    fn pipeline(endpoint: String) -> Pipeline<'static> {
        let settings = Settings {
            endpoint,
            ..Settings::default()
        };
        Pipeline::new(&settings, nlp::shared(), KeywordRules::default()).unwrap()
    }

    #[test]
    fn first_url_wins() {
        assert_eq!(
            find_url("Veja https://a.gov.br/edital e https://b.gov.br").as_deref(),
            Some("https://a.gov.br/edital")
        );
    }

    #[test]
    fn url_trailing_punctuation_trimmed() {
        assert_eq!(
            find_url("Analise (https://example.org/edital1).").as_deref(),
            Some("https://example.org/edital1")
        );
        assert_eq!(
            find_url("link: <http://example.org/a?b=1>").as_deref(),
            Some("http://example.org/a?b=1")
        );
    }

    #[test]
    fn balanced_parentheses_kept() {
        assert_eq!(
            find_url("Veja https://pt.wikipedia.org/wiki/Edital_(documento).").as_deref(),
            Some("https://pt.wikipedia.org/wiki/Edital_(documento)")
        );
        assert_eq!(
            find_url("(ver https://example.org/a_(b))").as_deref(),
            Some("https://example.org/a_(b)")
        );
    }

    #[test]
    fn www_gets_scheme() {
        assert_eq!(
            find_url("URL para análise: www.finep.gov.br/chamadas").as_deref(),
            Some("https://www.finep.gov.br/chamadas")
        );
    }

    #[test]
    fn no_url() {
        assert_eq!(find_url("Resuma os objetivos do edital."), None);
    }

    #[tokio::test]
    async fn no_url_fails_before_any_request() {
        let site = Responder::start(200, "text/html", EDITAL_PAGE).await;
        let llm = Responder::start(200, "application/json", r#"{"response": "ok"}"#).await;
        let p = pipeline(llm.url("/api/generate"));
        let mut stages = Vec::new();

        let err = p
            .run("Resuma os objetivos do edital.", |s| stages.push(s))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoUrlFound));
        assert_eq!(stages, vec![Stage::Failed]);
        assert_eq!(site.hits(), 0);
        assert_eq!(llm.hits(), 0);
    }

    #[tokio::test]
    async fn full_run_finds_key_sentence() {
        let site = Responder::start(200, "text/html", EDITAL_PAGE).await;
        let llm = Responder::start(200, "application/json", r#"{"response": "Objetivo: apoiar pesquisa."}"#).await;
        let p = pipeline(llm.url("/api/generate"));
        let instruction = format!("Summarize objectives. URL: {}", site.url("/edital1"));
        let mut stages = Vec::new();

        let report = p.run(&instruction, |s| stages.push(s)).await.unwrap();

        assert!(report
            .analysis
            .key_sentences
            .contains(&"O prazo de 30 dias conta da publicação.".to_string()));
        assert_eq!(report.analysis.entities.dates, vec!["30 dias"]);
        assert!(report.analysis.categories.is_empty());
        assert_eq!(report.answer.as_deref().unwrap(), "Objetivo: apoiar pesquisa.");
        assert_eq!(report.final_stage(), Stage::Done);
        assert_eq!(
            stages,
            vec![
                Stage::Fetching,
                Stage::Extracting,
                Stage::Composing,
                Stage::Requesting,
                Stage::Done,
            ]
        );

        let body: serde_json::Value = serde_json::from_str(&llm.last_body()).unwrap();
        let sent = body["prompt"].as_str().unwrap();
        assert!(sent.contains(&instruction));
        assert!(!sent.contains("Menu"));
        assert_eq!(sent, report.prompt);
    }

    #[tokio::test]
    async fn http_404_stops_before_generation() {
        let site = Responder::start(404, "text/html", "<p>Página não encontrada</p>").await;
        let llm = Responder::start(200, "application/json", r#"{"response": "ok"}"#).await;
        let p = pipeline(llm.url("/api/generate"));
        let mut stages = Vec::new();

        let err = p
            .run(&format!("Analise {}", site.url("/edital404")), |s| stages.push(s))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Fetch(FetchError::Status { status, .. }) if status.as_u16() == 404
        ));
        assert_eq!(stages, vec![Stage::Fetching, Stage::Failed]);
        assert_eq!(site.hits(), 1);
        assert_eq!(llm.hits(), 0);
    }

    #[tokio::test]
    async fn unreachable_model_keeps_extraction() {
        let site = Responder::start(200, "text/html", EDITAL_PAGE).await;
        let p = pipeline(unreachable_url("/api/generate").await);
        let mut stages = Vec::new();

        let report = p
            .run(&format!("Analise {}", site.url("/edital1")), |s| stages.push(s))
            .await
            .unwrap();

        assert!(matches!(report.answer, Err(GenerationError::Request(_))));
        assert_eq!(report.final_stage(), Stage::Failed);
        assert_eq!(stages.last(), Some(&Stage::Failed));
        assert!(!report.analysis.key_sentences.is_empty());
        assert!(report.page.plain_text.contains("Chamada 01/2024"));
    }
}
