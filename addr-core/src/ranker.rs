//! # Ranqueamento de Candidatos
//!
//! Transforma uma consulta ruidosa (ex: `"нпжнийновгород"`) em uma distribuição
//! de probabilidade sobre entradas da lista de referência.
//!
//! ## Algoritmo
//!
//! 1. **Recuperação**: distância de edição ponderada da consulta até cada entrada,
//!    agrupando as entradas em baldes por distância. Distância 0 encerra a busca:
//!    o resultado é a própria entrada com probabilidade 1.0.
//! 2. **Limite `k`**: quando o total de entradas nos baldes passa de `k`, o balde
//!    de maior distância é descartado **inteiro**. Com empates isso remove mais
//!    entradas do que o necessário (pode até esvaziar o shortlist); é uma
//!    imprecisão aceita, `k` é um teto e não um tamanho garantido.
//! 3. **Re-ranqueamento**: score = `exp(-d)`, onde `d` é a distância euclidiana
//!    entre vetores de frequência (modo padrão) ou a própria distância de edição.
//!    Scores idênticos bit a bit formam um único grupo.
//! 4. **Normalização**: probabilidade = score / Σ scores dos grupos, arredondada
//!    para 2 casas.
//!
//! ## Colisões de arredondamento
//!
//! Dois grupos distintos podem cair na mesma probabilidade arredondada. Eles são
//! **fundidos**: as listas de candidatos são concatenadas (maior score primeiro)
//! e a probabilidade do grupo fundido é a soma das frações antes do arredondamento,
//! arredondada. Nenhum candidato é perdido e a soma das probabilidades continua ≈ 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::distance::{weighted_edit_distance, EditWeights};
use crate::error::Result;
use crate::vectorizer::FrequencyVector;

/// Como o shortlist recuperado por distância de edição é re-ranqueado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankMode {
    /// `exp(-euclid(vetor(entrada), vetor(consulta)))`
    #[default]
    FrequencyVector,
    /// `exp(-distância de edição)`; não vetoriza, logo não falha com símbolos fora do alfabeto.
    EditDistance,
}

/// Um grupo de candidatos que compartilham a mesma probabilidade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGroup {
    pub probability: f64,
    pub candidates: Vec<String>,
}

/// Distribuição de probabilidade sobre entradas da referência, para um campo.
///
/// Grupos ordenados por probabilidade decrescente.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet {
    groups: Vec<CandidateGroup>,
}

impl CandidateSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Casamento exato: um único candidato com probabilidade 1.0.
    pub fn exact(entry: impl Into<String>) -> Self {
        Self {
            groups: vec![CandidateGroup {
                probability: 1.0,
                candidates: vec![entry.into()],
            }],
        }
    }

    pub fn from_groups(mut groups: Vec<CandidateGroup>) -> Self {
        groups.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Self { groups }
    }

    pub fn groups(&self) -> &[CandidateGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn best(&self) -> Option<&CandidateGroup> {
        self.groups.first()
    }

    pub fn best_probability(&self) -> Option<f64> {
        self.best().map(|g| g.probability)
    }

    /// Primeiro candidato do grupo mais provável.
    pub fn top_candidate(&self) -> Option<&str> {
        self.best()
            .and_then(|g| g.candidates.first())
            .map(String::as_str)
    }

    pub fn probability_sum(&self) -> f64 {
        self.groups.iter().map(|g| g.probability).sum()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.groups
            .iter()
            .any(|g| g.candidates.iter().any(|c| c == candidate))
    }
}

/// Resultado da etapa de recuperação por distância de edição.
#[derive(Debug, Clone, PartialEq)]
pub enum Shortlist {
    /// Alguma entrada tem distância 0.
    Exact(String),
    /// Baldes sobreviventes: distância → entradas naquela distância.
    Buckets(BTreeMap<u32, Vec<String>>),
}

impl Shortlist {
    /// Número total de entradas retidas.
    pub fn len(&self) -> usize {
        match self {
            Shortlist::Exact(_) => 1,
            Shortlist::Buckets(buckets) => buckets.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Busca dos vizinhos mais próximos limitada a `k` + normalização em probabilidades.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    pub weights: EditWeights,
    pub k_similar: usize,
    pub mode: RerankMode,
}

impl CandidateRanker {
    pub fn new(weights: EditWeights, k_similar: usize, mode: RerankMode) -> Self {
        Self {
            weights,
            k_similar,
            mode,
        }
    }

    /// Passos 1 e 2: recuperação por distância de edição com limite `k`.
    ///
    /// `reference` deve estar normalizada (minúsculas, sem espaços nas bordas).
    pub fn shortlist(&self, query: &str, reference: &[String]) -> Shortlist {
        let mut buckets: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        let mut retained = 0usize;

        for entry in reference {
            let dist = weighted_edit_distance(query, entry, &self.weights);
            if dist == 0 {
                return Shortlist::Exact(entry.clone());
            }
            buckets.entry(dist).or_default().push(entry.clone());
            retained += 1;

            if retained > self.k_similar {
                if let Some((_, evicted)) = buckets.pop_last() {
                    retained -= evicted.len();
                }
            }
        }

        Shortlist::Buckets(buckets)
    }

    /// Ranqueia `query` contra a lista de referência.
    pub fn rank(&self, query: &str, reference: &[String]) -> Result<CandidateSet> {
        let query = query.trim().to_lowercase();

        let buckets = match self.shortlist(&query, reference) {
            Shortlist::Exact(entry) => return Ok(CandidateSet::exact(entry)),
            Shortlist::Buckets(buckets) => buckets,
        };
        if buckets.is_empty() {
            return Ok(CandidateSet::empty());
        }

        // score → entradas, na ordem de descoberta
        let mut scored: Vec<(f64, Vec<String>)> = Vec::new();
        let query_vector = match self.mode {
            RerankMode::FrequencyVector => Some(FrequencyVector::from_word(&query)?),
            RerankMode::EditDistance => None,
        };

        for (dist, entries) in buckets {
            for entry in entries {
                let score = match &query_vector {
                    Some(qv) => (-FrequencyVector::from_word(&entry)?.euclidean(qv)).exp(),
                    None => (-(dist as f64)).exp(),
                };
                match scored.iter_mut().find(|(s, _)| s.to_bits() == score.to_bits()) {
                    Some((_, group)) => group.push(entry),
                    None => scored.push((score, vec![entry])),
                }
            }
        }

        Ok(normalize(scored))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normaliza grupos (score, candidatos) em probabilidades, fundindo colisões de arredondamento.
pub fn normalize(mut scored: Vec<(f64, Vec<String>)>) -> CandidateSet {
    let total: f64 = scored.iter().map(|(s, _)| s).sum();
    if scored.is_empty() || total <= 0.0 {
        return CandidateSet::empty();
    }
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    // (probabilidade arredondada em centésimos, soma das frações, candidatos)
    let mut merged: Vec<(i64, f64, Vec<String>)> = Vec::new();
    for (score, candidates) in scored {
        let share = score / total;
        let key = (share * 100.0).round() as i64;
        match merged.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, sum, group)) => {
                *sum += share;
                group.extend(candidates);
            }
            None => merged.push((key, share, candidates)),
        }
    }

    CandidateSet::from_groups(
        merged
            .into_iter()
            .map(|(_, share, candidates)| CandidateGroup {
                probability: round2(share),
                candidates,
            })
            .collect(),
    )
}
