use serde::Serialize;

/// A preset instruction the operator can start from. The text ends where the
/// edital URL is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub text: &'static str,
}

pub const BASIC: PromptTemplate = PromptTemplate {
    key: "basic",
    label: "Análise Básica",
    text: "Extraia e categorize informações sobre chamadas públicas, incluindo:
- Título
- Objetivo
- Linha temática
- Tipo de recurso financeiro
- Contrapartida obrigatória
- Prazos

URL para análise: ",
};

pub const ELIGIBILITY: PromptTemplate = PromptTemplate {
    key: "eligibility",
    label: "Análise de Elegibilidade",
    text: "Analise este edital e determine:
- Quem pode participar
- Requisitos principais
- Restrições importantes
- Contrapartida necessária

URL para análise: ",
};

pub const FINANCIAL: PromptTemplate = PromptTemplate {
    key: "financial",
    label: "Análise Financeira",
    text: "Analise os aspectos financeiros:
- Valor total disponível
- Tipos de recursos
- Contrapartidas
- Itens financiáveis

URL para análise: ",
};

pub const PRESETS: [PromptTemplate; 3] = [BASIC, ELIGIBILITY, FINANCIAL];

impl PromptTemplate {
    /// Template text followed by the URL to analyse.
    pub fn with_url(&self, url: &str) -> String {
        format!("{}{}", self.text, url)
    }
}
