use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{EntityLabel, EntitySpan, LinguisticModel};

const MONTHS: &str =
    "janeiro|fevereiro|março|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        concat!(
            r"(?i)\b\d{{1,2}}/\d{{1,2}}/\d{{2,4}}\b",
            r"|\b\d{{1,2}}º?\s+de\s+(?:{m})(?:\s+de\s+\d{{4}})?\b",
            r"|\b(?:{m})\s+de\s+\d{{4}}\b",
            r"|\b\d+\s+(?:dias?|semanas?|meses|mês|anos?)(?:\s+(?:úteis|corridos))?\b",
        ),
        m = MONTHS
    ))
    .unwrap()
});
static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:R\$|US\$|€)\s?\d+(?:\.\d{3})*(?:,\d{1,2})?(?:\s+(?:milhões|milhão|mil|bilhões|bilhão)\b)?",
        r"|\b\d+(?:,\d+)?\s+(?:milhões|milhão|bilhões|bilhão)\s+de\s+reais\b",
        r"|\b\d+(?:\.\d{3})*(?:,\d{2})?\s+(?:mil\s+)?(?:reais|dólares|euros)\b",
    ))
    .unwrap()
});
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:,\d+)?\s?%").unwrap());
static ORG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:Ministério|Secretaria|Fundação|Universidade|Instituto|Agência|Conselho|Banco",
        r"|Empresa|Associação|Prefeitura|Governo|Câmara|Companhia|Centro|Coordenação",
        r"|Departamento|Superintendência|Serviço|Federação|Confederação)",
        r"(?:\s+(?:(?:d[aoe]s?|e|à|ao|para|em)\s+)?\p{Lu}[\p{L}\p{N}-]*)+",
    ))
    .unwrap()
});
static ACRONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}[a-z]?[A-Z]*\b").unwrap());
static ROMAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVXLCDM]+$").unwrap());

/// Upper-case words that show up in edital headings but are not organizations.
const ACRONYM_STOPWORDS: &[&str] = &[
    "DAS", "DOS", "PARA", "COM", "POR", "EDITAL", "EDITAIS", "CHAMADA", "ANEXO", "ANEXOS",
    "ITEM", "NOTA", "TOTAL", "VALOR", "PRAZO", "OBJETIVO", "ETAPA", "FASE", "SIM", "PDF",
    "URL", "HTML", "HTTP", "HTTPS", "WWW", "CPF", "CNPJ", "CEP", "PIX", "OBS", "FAQ",
];

const ABBREVIATIONS: &[&str] = &[
    "art", "arts", "sr", "sra", "dr", "dra", "prof", "profa", "nº", "n", "inc", "fl", "pág",
    "cap", "av", "tel", "ex", "p",
];

/// Regex and word-list tagger for Portuguese edital text.
pub struct RuleModel {
    abbreviations: HashSet<&'static str>,
    acronym_stopwords: HashSet<&'static str>,
}

impl RuleModel {
    pub fn portuguese() -> Self {
        RuleModel {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            acronym_stopwords: ACRONYM_STOPWORDS.iter().copied().collect(),
        }
    }

    fn split_line<'a>(&self, line: &'a str, out: &mut Vec<&'a str>) {
        let mut start = 0;
        let mut chars = line.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }

            // Absorb trailing punctuation and closing quotes: "fim.)" / "sério?!"
            let mut end = i + c.len_utf8();
            while let Some(&(j, p)) = chars.peek() {
                if matches!(p, '.' | '!' | '?' | '"' | '\'' | ')' | '”' | '»') {
                    end = j + p.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            // "1.000" or end of line: not a boundary here
            if !matches!(chars.peek(), Some(&(_, next)) if next.is_whitespace()) {
                continue;
            }
            if c == '.' && self.is_abbreviation(&line[start..i]) {
                continue;
            }

            push_trimmed(&line[start..end], out);
            start = end;
        }

        push_trimmed(&line[start..], out);
    }

    fn is_abbreviation(&self, before_dot: &str) -> bool {
        let word = before_dot
            .rsplit(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        let single_initial = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
        single_initial || self.abbreviations.contains(word.to_lowercase().as_str())
    }

    fn is_acronym(&self, word: &str) -> bool {
        word.len() >= 3
            && word.len() <= 12
            && !ROMAN_RE.is_match(word)
            && !self.acronym_stopwords.contains(word)
    }
}

impl LinguisticModel for RuleModel {
    fn segment_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        for line in text.lines() {
            self.split_line(line, &mut sentences);
        }
        sentences
    }

    fn extract_entities(&self, text: &str) -> Vec<EntitySpan> {
        let patterns: [(EntityLabel, &Regex); 4] = [
            (EntityLabel::Date, &*DATE_RE),
            (EntityLabel::Money, &*MONEY_RE),
            (EntityLabel::Percent, &*PERCENT_RE),
            (EntityLabel::Org, &*ORG_RE),
        ];

        let mut spans: Vec<EntitySpan> = patterns
            .iter()
            .flat_map(|(label, re)| {
                re.find_iter(text).map(move |m| EntitySpan {
                    label: *label,
                    text: m.as_str().to_string(),
                    start: m.start(),
                })
            })
            .collect();

        spans.extend(
            ACRONYM_RE
                .find_iter(text)
                .filter(|m| self.is_acronym(m.as_str()))
                .map(|m| EntitySpan {
                    label: EntityLabel::Org,
                    text: m.as_str().to_string(),
                    start: m.start(),
                }),
        );

        // Earliest span wins; on a tie the longer one.
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.text.len().cmp(&a.text.len())));
        let mut resolved = Vec::with_capacity(spans.len());
        let mut covered_to = 0;
        for span in spans {
            if span.start >= covered_to {
                covered_to = span.start + span.text.len();
                resolved.push(span);
            }
        }
        resolved
    }
}

fn push_trimmed<'a>(s: &'a str, out: &mut Vec<&'a str>) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(t);
    }
}

// ── Tests ──
