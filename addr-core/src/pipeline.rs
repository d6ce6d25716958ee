//! # Pipeline de Endereços — Orquestrador com Eventos Observáveis
//!
//! O [`AddressParser`] conecta tokenizador e extratores em ordem fixa
//! (Índice → Rua → Casa → Cidade) e, opcionalmente, emite um [`ParseEvent`] a
//! cada passo via canal `mpsc`, permitindo que o servidor WebSocket transmita o
//! progresso em tempo real.
//!
//! A configuração (base de referência + [`ParserSettings`]) é imutável durante
//! toda a vida do parser; várias threads podem chamar `parse` ao mesmo tempo.

use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::error::{ParseError, Result};
use crate::extract::{extract_city, extract_house, extract_index, extract_street, ExtractContext};
use crate::ranker::{CandidateRanker, CandidateSet};
use crate::reference::ReferenceDatabase;
use crate::settings::{KeywordSets, ParserSettings};
use crate::tokenizer::{remove_indices, tokenize, Token};

/// Valor do índice quando nenhum token de seis dígitos foi encontrado.
pub const INDEX_NOT_IDENTIFIED: &str = "not identified";

/// O registro de saída de uma linha de endereço.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Seis dígitos ou [`INDEX_NOT_IDENTIFIED`].
    pub index: String,
    pub city: CandidateSet,
    pub street: CandidateSet,
    pub house: Option<String>,
}

impl AddressRecord {
    fn new() -> Self {
        Self {
            index: INDEX_NOT_IDENTIFIED.to_string(),
            city: CandidateSet::empty(),
            street: CandidateSet::empty(),
            house: None,
        }
    }

    pub fn has_index(&self) -> bool {
        self.index != INDEX_NOT_IDENTIFIED
    }
}

/// Campo do registro produzido por um extrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Index,
    Street,
    House,
    City,
}

/// Eventos emitidos durante a análise de uma linha.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ParseEvent {
    /// **Passo 1**: sequência de tokens inicial.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passos 2–5**: um extrator terminou; `consumed` pode estar vazio.
    FieldExtracted {
        field: Field,
        consumed: Vec<Token>,
        remaining: usize,
    },
    /// Tokens que sobraram após os quatro extratores (descartados).
    LeftoversDiscarded { tokens: Vec<Token> },
    /// **Conclusão**: registro final.
    Done {
        record: AddressRecord,
        processing_ms: u64,
    },
    /// **Falha**: a linha inteira foi abortada.
    Error { kind: String, message: String },
}

/// O parser de endereços.
pub struct AddressParser {
    reference: ReferenceDatabase,
    settings: ParserSettings,
    keywords: KeywordSets,
    ranker: CandidateRanker,
}

impl AddressParser {
    /// Valida a configuração e monta o parser.
    pub fn new(reference: ReferenceDatabase, settings: ParserSettings) -> Result<Self> {
        if settings.k_similar == 0 {
            return Err(ParseError::Configuration(
                "k_similar must be at least 1".to_string(),
            ));
        }
        let keywords = KeywordSets::from_settings(&settings)?;
        let ranker = CandidateRanker::new(settings.weights, settings.k_similar, settings.rerank);
        Ok(Self {
            reference,
            settings,
            keywords,
            ranker,
        })
    }

    /// Parser com a configuração padrão.
    pub fn with_defaults(reference: ReferenceDatabase) -> Result<Self> {
        Self::new(reference, ParserSettings::default())
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn reference(&self) -> &ReferenceDatabase {
        &self.reference
    }

    /// Analisa uma linha de forma síncrona.
    pub fn parse(&self, line: &str) -> Result<AddressRecord> {
        self.run(line, None)
    }

    /// Analisa uma linha enviando [`ParseEvent`]s pelo canal `tx`.
    ///
    /// O último evento é sempre `Done` ou `Error`. Um receptor fechado não interrompe a análise.
    pub fn parse_streaming(&self, line: &str, tx: mpsc::Sender<ParseEvent>) -> Result<AddressRecord> {
        let result = self.run(line, Some(&tx));
        if let Err(err) = &result {
            let _ = tx.send(ParseEvent::Error {
                kind: err.kind().to_string(),
                message: err.to_string(),
            });
        }
        result
    }

    /// Analisa várias linhas em paralelo; os resultados seguem a ordem de entrada.
    pub fn parse_batch<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Vec<Result<AddressRecord>> {
        lines.par_iter().map(|line| self.parse(line.as_ref())).collect()
    }

    fn run(&self, line: &str, tx: Option<&mpsc::Sender<ParseEvent>>) -> Result<AddressRecord> {
        let _span = debug_span!("parse", line).entered();
        let start = Instant::now();
        let emit = |event: ParseEvent| {
            if let Some(tx) = tx {
                let _ = tx.send(event);
            }
        };

        // === Passo 1: Tokenização ===
        let mut tokens = tokenize(line, self.keywords.separators());
        debug!(total = tokens.len(), "tokenized");
        emit(ParseEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        let ctx = ExtractContext {
            keywords: &self.keywords,
            ranker: &self.ranker,
            reference: &self.reference,
            parallel: self.settings.parallel_street_scoring,
        };
        let mut record = AddressRecord::new();

        // Remove os tokens consumidos em um único passo e notifica
        let consume = |tokens: &mut Vec<Token>, field: Field, consumed: &[usize]| {
            let taken: Vec<Token> = consumed.iter().map(|&i| tokens[i].clone()).collect();
            remove_indices(tokens, consumed);
            debug!(?field, consumed = taken.len(), remaining = tokens.len(), "field extracted");
            emit(ParseEvent::FieldExtracted {
                field,
                consumed: taken,
                remaining: tokens.len(),
            });
        };

        // === Passo 2: Índice ===
        let index = extract_index(&tokens);
        if let Some(value) = index.value {
            record.index = value;
        }
        consume(&mut tokens, Field::Index, &index.consumed);

        // === Passo 3: Rua ===
        let street = extract_street(&tokens, &ctx)?;
        record.street = street.value;
        consume(&mut tokens, Field::Street, &street.consumed);

        // === Passo 4: Casa ===
        let house = extract_house(&tokens);
        record.house = house.value;
        consume(&mut tokens, Field::House, &house.consumed);

        // === Passo 5: Cidade ===
        let city = extract_city(&tokens, &ctx)?;
        record.city = city.value;
        consume(&mut tokens, Field::City, &city.consumed);

        // === Passo 6: Sobras ===
        if !tokens.is_empty() {
            let unparsed: Vec<&str> = tokens
                .iter()
                .filter(|t| !self.keywords.is_keyword(&t.text))
                .map(|t| t.text.as_str())
                .collect();
            debug!(?unparsed, "leftover tokens discarded");
            emit(ParseEvent::LeftoversDiscarded { tokens });
        }

        emit(ParseEvent::Done {
            record: record.clone(),
            processing_ms: start.elapsed().as_millis() as u64,
        });
        Ok(record)
    }
}
