//! # Busca de Spans Ancorada por Palavra-chave
//!
//! Rotina única usada pelos extratores de rua e de cidade. Um *span* é uma
//! janela de tokens adjacentes; cada span vira uma consulta (tokens unidos por
//! espaço, opcionalmente seguidos de um sufixo como `"улица"`) ranqueada contra
//! uma lista de referência.
//!
//! ## Dois regimes
//!
//! - **Ancorado**: há um marcador (ex: `"ул."`). Janelas de 1..=`max_window`
//!   tokens imediatamente antes e/ou depois dele.
//! - **Livre**: sem marcador. Todas as janelas contíguas de 1..=`max_window`.
//!
//! Em ambos, janelas que contêm outra palavra-chave ou que atravessam a borda da
//! sequência simplesmente não são geradas.
//!
//! ## Escolha do vencedor
//!
//! Cada span é pontuado de forma independente (em paralelo com rayon, se
//! habilitado). O vencedor é o máximo de uma ordem total:
//! maior probabilidade do melhor grupo → casamento exato → span mais largo →
//! menor ordinal de geração. O critério de casamento exato existe porque um
//! shortlist que sobrou com uma única entrada também recebe probabilidade 1.0.
//! Como a ordem é total, o resultado não depende da ordem de avaliação.
//! Spans sem nenhum candidato são ignorados.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::ranker::{CandidateRanker, CandidateSet};
use crate::settings::KeywordSets;
use crate::tokenizer::Token;

/// Lado do marcador em que a janela é construída.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Before,
    After,
}

/// Um span a ser pontuado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanCandidate {
    /// Índice do primeiro token na fatia atual
    pub start: usize,
    pub len: usize,
    /// Texto consultado na referência
    pub query: String,
    /// Ordem de geração; desempate final
    pub ordinal: usize,
}

impl SpanCandidate {
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// O span vencedor com sua distribuição de candidatos.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMatch {
    pub span: SpanCandidate,
    pub candidates: CandidateSet,
    pub probability: f64,
    /// A consulta é idêntica a uma entrada da referência
    pub exact: bool,
}

/// Ordem total usada na seleção do máximo.
fn compare(a: &SpanMatch, b: &SpanMatch) -> Ordering {
    a.probability
        .total_cmp(&b.probability)
        .then(a.exact.cmp(&b.exact))
        .then(a.span.len.cmp(&b.span.len))
        .then(b.span.ordinal.cmp(&a.span.ordinal))
}

fn build_query(tokens: &[Token], suffix: Option<&str>) -> String {
    let mut query = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(suffix) = suffix {
        query.push(' ');
        query.push_str(suffix);
    }
    query
}

pub struct SpanSearch<'a> {
    pub keywords: &'a KeywordSets,
    pub ranker: &'a CandidateRanker,
    pub reference: &'a [String],
    pub max_window: usize,
    pub parallel: bool,
}

impl<'a> SpanSearch<'a> {
    fn has_keyword(&self, window: &[Token]) -> bool {
        window.iter().any(|t| self.keywords.is_keyword(&t.text))
    }

    /// Janelas de 1..=`max_window` tokens ao redor de `anchor`, nas direções pedidas.
    pub fn anchored_spans(
        &self,
        tokens: &[Token],
        anchor: usize,
        directions: &[Direction],
        suffix: Option<&str>,
    ) -> Vec<SpanCandidate> {
        let mut spans = Vec::new();
        for width in 1..=self.max_window {
            for direction in directions {
                let start = match direction {
                    Direction::Before if anchor >= width => anchor - width,
                    Direction::After if anchor + 1 + width <= tokens.len() => anchor + 1,
                    _ => continue,
                };
                let window = &tokens[start..start + width];
                if self.has_keyword(window) {
                    continue;
                }
                spans.push(SpanCandidate {
                    start,
                    len: width,
                    query: build_query(window, suffix),
                    ordinal: spans.len(),
                });
            }
        }
        spans
    }

    /// Todas as janelas contíguas sem palavras-chave, combinadas com cada sufixo.
    pub fn free_spans(&self, tokens: &[Token], suffixes: &[Option<&str>]) -> Vec<SpanCandidate> {
        let mut spans = Vec::new();
        for width in 1..=self.max_window.min(tokens.len()) {
            for start in 0..=tokens.len() - width {
                let window = &tokens[start..start + width];
                if self.has_keyword(window) {
                    continue;
                }
                for suffix in suffixes {
                    spans.push(SpanCandidate {
                        start,
                        len: width,
                        query: build_query(window, *suffix),
                        ordinal: spans.len(),
                    });
                }
            }
        }
        spans
    }

    /// Pontua todos os spans e devolve o melhor, ou `None` se nenhum produziu candidatos.
    ///
    /// O primeiro erro (na ordem de geração) aborta a busca.
    pub fn best(&self, spans: Vec<SpanCandidate>) -> Result<Option<SpanMatch>> {
        let rank = |span: &SpanCandidate| self.ranker.rank(&span.query, self.reference);
        let scored: Vec<Result<CandidateSet>> = if self.parallel {
            spans.par_iter().map(rank).collect()
        } else {
            spans.iter().map(rank).collect()
        };

        let mut matches = Vec::with_capacity(spans.len());
        for (span, result) in spans.into_iter().zip(scored) {
            let candidates = result?;
            match candidates.best_probability() {
                Some(probability) => {
                    let exact = probability == 1.0
                        && candidates.top_candidate() == Some(span.query.as_str());
                    trace!(query = %span.query, probability, exact, "span scored");
                    matches.push(SpanMatch {
                        span,
                        candidates,
                        probability,
                        exact,
                    });
                }
                None => trace!(query = %span.query, "span skipped, no candidates"),
            }
        }

        Ok(matches.into_iter().max_by(compare))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EditWeights;
    use crate::ranker::RerankMode;
    use crate::settings::ParserSettings;
    use crate::tokenizer::tokenize;

    fn keywords() -> KeywordSets {
        KeywordSets::from_settings(&ParserSettings::default()).unwrap()
    }

    fn ranker() -> CandidateRanker {
        CandidateRanker::new(EditWeights::default(), 3, RerankMode::FrequencyVector)
    }

    fn queries(spans: &[SpanCandidate]) -> Vec<&str> {
        spans.iter().map(|s| s.query.as_str()).collect()
    }

    #[test]
    fn test_anchored_spans_both_directions() {
        let kw = keywords();
        let r = ranker();
        let reference = vec!["родниковая улица".to_string()];
        let search = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 3, parallel: false };
        let tokens = tokenize("нижний новгород ул родниковая 6а", &[',']);
        let spans = search.anchored_spans(&tokens, 2, &[Direction::Before, Direction::After], Some("улица"));
        assert_eq!(
            queries(&spans),
            [
                "новгород улица",
                "родниковая улица",
                "нижний новгород улица",
                "родниковая 6а улица",
            ]
        );
        let ordinals: Vec<usize> = spans.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, [0, 1, 2, 3]);
    }

    #[test]
    fn test_anchored_spans_skip_keywords_and_bounds() {
        let kw = keywords();
        let r = ranker();
        let reference = vec!["москва".to_string()];
        let search = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 2, parallel: false };
        let tokens = tokenize("г. москва", &[',']);
        let spans = search.anchored_spans(&tokens, 0, &[Direction::After], None);
        assert_eq!(queries(&spans), ["москва"]);

        let tokens = tokenize("москва г. д. 5", &[',']);
        let spans = search.anchored_spans(&tokens, 1, &[Direction::After], None);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_free_spans_all_windows_and_suffixes() {
        let kw = keywords();
        let r = ranker();
        let reference = vec!["москва".to_string()];
        let search = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 2, parallel: false };
        let tokens = tokenize("а б ул в", &[',']);
        let spans = search.free_spans(&tokens, &[Some("x"), Some("y")]);
        assert_eq!(
            queries(&spans),
            ["а x", "а y", "б x", "б y", "в x", "в y", "а б x", "а б y"]
        );
    }

    #[test]
    fn test_best_prefers_exact_match() {
        let kw = keywords();
        let r = ranker();
        let reference: Vec<String> = ["ленина улица", "мира проспект", "садовая улица"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let search = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 3, parallel: false };
        let tokens = tokenize("москва ул ленина", &[',']);
        let spans = search.anchored_spans(&tokens, 1, &[Direction::Before, Direction::After], Some("улица"));
        let best = search.best(spans).unwrap().unwrap();
        assert_eq!(best.span.start, 2);
        assert_eq!(best.probability, 1.0);
        assert!(best.exact);
        assert_eq!(best.candidates.top_candidate(), Some("ленина улица"));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let kw = keywords();
        let r = ranker();
        let reference: Vec<String> = crate::corpus::DEMO_STREETS
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let tokens = tokenize("нижний новгород родникова кемеровский", &[',']);
        let suffixes: Vec<Option<&str>> = kw.full_street_types().iter().map(|s| Some(s.as_str())).collect();

        let sequential = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 3, parallel: false };
        let parallel = SpanSearch { parallel: true, ..sequential };
        let a = sequential.best(sequential.free_spans(&tokens, &suffixes)).unwrap();
        let b = parallel.best(parallel.free_spans(&tokens, &suffixes)).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_best_of_nothing() {
        let kw = keywords();
        let r = ranker();
        let reference = vec!["москва".to_string()];
        let search = SpanSearch { keywords: &kw, ranker: &r, reference: &reference, max_window: 2, parallel: false };
        assert_eq!(search.best(Vec::new()).unwrap(), None);
    }

    #[test]
    fn test_compare_tie_breaks() {
        let mk = |len, ordinal, probability, exact| SpanMatch {
            span: SpanCandidate { start: 0, len, query: String::new(), ordinal },
            candidates: CandidateSet::empty(),
            probability,
            exact,
        };
        assert_eq!(compare(&mk(1, 0, 0.9, false), &mk(3, 1, 0.8, false)), Ordering::Greater);
        assert_eq!(compare(&mk(1, 3, 1.0, true), &mk(2, 0, 1.0, false)), Ordering::Greater);
        assert_eq!(compare(&mk(2, 5, 0.8, false), &mk(1, 0, 0.8, false)), Ordering::Greater);
        assert_eq!(compare(&mk(2, 0, 0.8, false), &mk(2, 4, 0.8, false)), Ordering::Greater);
    }
}
