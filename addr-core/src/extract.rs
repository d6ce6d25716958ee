//! # Extratores de Campos
//!
//! Cada extrator **lê** a sequência de tokens e devolve o valor do campo junto
//! com a lista de índices que consumiu; quem remove os tokens é o pipeline, em
//! um único passo (ver [`crate::tokenizer::remove_indices`]). Ordem fixa:
//!
//! 1. **Índice**: primeiro token com exatamente seis dígitos.
//! 2. **Rua**: busca de spans ancorada no marcador de tipo de rua, ou livre.
//! 3. **Casa**: primeiro token que contém um dígito.
//! 4. **Cidade**: busca de spans ancorada no marcador de cidade, ou livre.
//!
//! Índice e casa nunca falham. Rua e cidade falham quando nenhum span produz
//! candidatos, porque quem consome o registro conta com esses campos.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{ParseError, Result};
use crate::ranker::{CandidateRanker, CandidateSet};
use crate::reference::ReferenceDatabase;
use crate::settings::KeywordSets;
use crate::span::{Direction, SpanMatch, SpanSearch};
use crate::tokenizer::Token;

/// Maior janela avaliada para a rua.
pub const STREET_MAX_WINDOW: usize = 3;
/// Maior janela avaliada para a cidade.
pub const CITY_MAX_WINDOW: usize = 2;

/// Valor extraído + índices (na fatia atual) dos tokens consumidos.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub consumed: Vec<usize>,
}

impl<T> Extraction<T> {
    fn nothing(value: T) -> Self {
        Self {
            value,
            consumed: Vec::new(),
        }
    }
}

/// Recursos compartilhados, somente leitura, usados pelos extratores difusos.
pub struct ExtractContext<'a> {
    pub keywords: &'a KeywordSets,
    pub ranker: &'a CandidateRanker,
    pub reference: &'a ReferenceDatabase,
    pub parallel: bool,
}

impl<'a> ExtractContext<'a> {
    fn search(&self, reference: &'a [String], max_window: usize) -> SpanSearch<'a> {
        SpanSearch {
            keywords: self.keywords,
            ranker: self.ranker,
            reference,
            max_window,
            parallel: self.parallel,
        }
    }
}

fn postal_index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{6}$").expect("postal index pattern is valid"))
}

/// Primeiro token puramente numérico com seis caracteres.
pub fn extract_index(tokens: &[Token]) -> Extraction<Option<String>> {
    match tokens
        .iter()
        .position(|t| postal_index_pattern().is_match(&t.text))
    {
        Some(i) => Extraction {
            value: Some(tokens[i].text.clone()),
            consumed: vec![i],
        },
        None => Extraction::nothing(None),
    }
}

/// Primeiro token com ao menos um dígito (`"30"`, `"6а"`, `"30/2"`).
pub fn extract_house(tokens: &[Token]) -> Extraction<Option<String>> {
    match tokens
        .iter()
        .position(|t| t.text.chars().any(|c| c.is_ascii_digit()))
    {
        Some(i) => Extraction {
            value: Some(tokens[i].text.clone()),
            consumed: vec![i],
        },
        None => Extraction::nothing(None),
    }
}

fn consumed_by(m: &SpanMatch, anchor: Option<usize>) -> Vec<usize> {
    anchor.into_iter().chain(m.span.indices()).collect()
}

/// Rua: marcador de tipo presente → janelas de 1..=3 antes e depois dele, cada
/// uma seguida da forma completa do tipo; sem marcador (ou sem janela ranqueável
/// ao redor dele) → todas as janelas livres × todos os tipos completos.
pub fn extract_street(tokens: &[Token], ctx: &ExtractContext<'_>) -> Result<Extraction<CandidateSet>> {
    let search = ctx.search(ctx.reference.streets(), STREET_MAX_WINDOW);

    let anchor = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| ctx.keywords.street_type(&t.text).map(|full| (i, full)));

    if let Some((anchor, full_type)) = anchor {
        let spans = search.anchored_spans(
            tokens,
            anchor,
            &[Direction::Before, Direction::After],
            Some(full_type),
        );
        if let Some(m) = search.best(spans)? {
            debug!(
                keyword = %tokens[anchor].text,
                query = %m.span.query,
                probability = m.probability,
                "street resolved next to keyword"
            );
            return Ok(Extraction {
                consumed: consumed_by(&m, Some(anchor)),
                value: m.candidates,
            });
        }
        warn!(keyword = %tokens[anchor].text, "no rankable window around street keyword, searching all spans");
    }

    let suffixes: Vec<Option<&str>> = ctx
        .keywords
        .full_street_types()
        .iter()
        .map(|s| Some(s.as_str()))
        .collect();
    let spans = search.free_spans(tokens, &suffixes);
    match search.best(spans)? {
        Some(m) => {
            debug!(query = %m.span.query, probability = m.probability, "street resolved without keyword");
            Ok(Extraction {
                consumed: consumed_by(&m, None),
                value: m.candidates,
            })
        }
        None => Err(ParseError::RankingInconsistency(format!(
            "no street span could be ranked among {} tokens",
            tokens.len()
        ))),
    }
}

/// Cidade: marcador presente → 1 ou 2 tokens logo depois dele (empate fica com
/// o de 2); sem marcador → todos os 1-gramas e 2-gramas sem palavras-chave.
///
/// O marcador não é consumido; ele sai junto com as demais palavras-chave que sobrarem.
pub fn extract_city(tokens: &[Token], ctx: &ExtractContext<'_>) -> Result<Extraction<CandidateSet>> {
    let search = ctx.search(ctx.reference.cities(), CITY_MAX_WINDOW);

    if let Some(anchor) = tokens.iter().position(|t| ctx.keywords.is_city_keyword(&t.text)) {
        let spans = search.anchored_spans(tokens, anchor, &[Direction::After], None);
        if let Some(m) = search.best(spans)? {
            debug!(
                keyword = %tokens[anchor].text,
                query = %m.span.query,
                probability = m.probability,
                "city resolved next to keyword"
            );
            return Ok(Extraction {
                consumed: consumed_by(&m, None),
                value: m.candidates,
            });
        }
        warn!(keyword = %tokens[anchor].text, "no rankable span after city keyword, searching all spans");
    }

    let spans = search.free_spans(tokens, &[None]);
    match search.best(spans)? {
        Some(m) => {
            debug!(query = %m.span.query, probability = m.probability, "city resolved without keyword");
            Ok(Extraction {
                consumed: consumed_by(&m, None),
                value: m.candidates,
            })
        }
        None => Err(ParseError::UnresolvedCity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_reference;
    use crate::distance::EditWeights;
    use crate::ranker::RerankMode;
    use crate::settings::ParserSettings;
    use crate::tokenizer::tokenize;

    const SEPARATORS: &[char] = &[',', ';', ':', '.'];

    struct Fixture {
        keywords: KeywordSets,
        ranker: CandidateRanker,
        reference: ReferenceDatabase,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                keywords: KeywordSets::from_settings(&ParserSettings::default()).unwrap(),
                ranker: CandidateRanker::new(EditWeights::default(), 3, RerankMode::FrequencyVector),
                reference: demo_reference().unwrap(),
            }
        }

        fn ctx(&self) -> ExtractContext<'_> {
            ExtractContext {
                keywords: &self.keywords,
                ranker: &self.ranker,
                reference: &self.reference,
                parallel: false,
            }
        }
    }

    #[test]
    fn test_index_found() {
        let tokens = tokenize("123456;Ул. Дворовая;30;Москва", SEPARATORS);
        let ex = extract_index(&tokens);
        assert_eq!(ex.value.as_deref(), Some("123456"));
        assert_eq!(ex.consumed, [0]);
    }

    #[test]
    fn test_index_requires_exactly_six_digits() {
        let tokens = tokenize("12345, 1234567, 12345а, 654321", SEPARATORS);
        let ex = extract_index(&tokens);
        assert_eq!(ex.value.as_deref(), Some("654321"));
        assert_eq!(ex.consumed, [3]);

        let tokens = tokenize("Москва, Ленина, 30", SEPARATORS);
        let ex = extract_index(&tokens);
        assert_eq!(ex.value, None);
        assert!(ex.consumed.is_empty());
    }

    #[test]
    fn test_house_first_token_with_digit() {
        let tokens = tokenize("6а ростов-на-улду ул енина", SEPARATORS);
        let ex = extract_house(&tokens);
        assert_eq!(ex.value.as_deref(), Some("6а"));
        assert_eq!(ex.consumed, [0]);

        let tokens = tokenize("москва ленина", SEPARATORS);
        assert_eq!(extract_house(&tokens).value, None);
    }

    #[test]
    fn test_street_with_keyword_after() {
        let fx = Fixture::new();
        let tokens = tokenize("г. Нижний Новгород, ул. Родниковая, 6а", SEPARATORS);
        let ex = extract_street(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value, CandidateSet::exact("родниковая улица"));
        assert_eq!(ex.consumed, [3, 4]);
    }

    #[test]
    fn test_street_with_keyword_before() {
        let fx = Fixture::new();
        let tokens = tokenize("1-й кемеровский переулок,гор. Ростов-на-Улду,6а", SEPARATORS);
        let ex = extract_street(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value.top_candidate(), Some("1-й кемеровский переулок"));
        assert_eq!(ex.consumed, [2, 0, 1]);
    }

    #[test]
    fn test_street_without_keyword() {
        let fx = Fixture::new();
        let tokens = tokenize("гор. НпжнийНовгород, Родниковая 6а", SEPARATORS);
        let ex = extract_street(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value, CandidateSet::exact("родниковая улица"));
        assert_eq!(ex.consumed, [2]);
    }

    #[test]
    fn test_street_nothing_to_rank() {
        let fx = Fixture::new();
        let tokens = tokenize("г. д.", SEPARATORS);
        let err = extract_street(&tokens, &fx.ctx()).unwrap_err();
        assert_eq!(err.kind(), "ranking_inconsistency");
        let err = extract_street(&[], &fx.ctx()).unwrap_err();
        assert_eq!(err.kind(), "ranking_inconsistency");
    }

    #[test]
    fn test_city_keyword_prefers_exact_two_tokens() {
        let fx = Fixture::new();
        let tokens = tokenize("г. нижний новгород", SEPARATORS);
        let ex = extract_city(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value, CandidateSet::exact("нижний новгород"));
        assert_eq!(ex.consumed, [1, 2]);
    }

    #[test]
    fn test_city_typo_after_keyword() {
        let fx = Fixture::new();
        let tokens = tokenize("гор. НпжнийНовгород", SEPARATORS);
        let ex = extract_city(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value.top_candidate(), Some("нижний новгород"));
        assert_eq!(ex.consumed, [1]);
    }

    #[test]
    fn test_city_without_keyword() {
        let fx = Fixture::new();
        let tokens = tokenize("дом Масква", SEPARATORS);
        let ex = extract_city(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value.top_candidate(), Some("москва"));
        assert_eq!(ex.consumed, [1]);
    }

    #[test]
    fn test_city_keyword_at_end_falls_back() {
        let fx = Fixture::new();
        let tokens = tokenize("самара г.", SEPARATORS);
        let ex = extract_city(&tokens, &fx.ctx()).unwrap();
        assert_eq!(ex.value, CandidateSet::exact("самара"));
        assert_eq!(ex.consumed, [0]);
    }

    #[test]
    fn test_city_unresolved() {
        let fx = Fixture::new();
        let tokens = tokenize("г. дом", SEPARATORS);
        assert_eq!(extract_city(&tokens, &fx.ctx()).unwrap_err(), ParseError::UnresolvedCity);
        assert_eq!(extract_city(&[], &fx.ctx()).unwrap_err(), ParseError::UnresolvedCity);
    }
}
