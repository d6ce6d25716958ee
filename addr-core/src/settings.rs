//! # Configuração do Parser
//!
//! [`ParserSettings`] é a superfície de configuração serializável (JSON): pesos
//! da distância de edição, `k`, modo de re-ranqueamento, separadores, conjuntos
//! de palavras-chave e o mapa de abreviações de tipo de rua.
//!
//! [`KeywordSets`] é a forma validada e imutável dessas listas, construída uma
//! vez por [`crate::pipeline::AddressParser`] e compartilhada por todas as chamadas.
//!
//! ## Palavras-chave com pontuação
//!
//! Como o tokenizador só troca o separador dominante, marcadores chegam como
//! `"ул."` ou `"г."`. A comparação com os conjuntos ignora separadores **no fim**
//! do token; o texto do token não é alterado.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::distance::EditWeights;
use crate::error::{ParseError, Result};
use crate::ranker::RerankMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    pub weights: EditWeights,
    /// Máximo de vizinhos (por distância de edição) mantidos antes do re-ranqueamento.
    pub k_similar: usize,
    pub rerank: RerankMode,
    /// Cada elemento deve ser exatamente um caractere; a ordem desempata o separador dominante.
    pub separators: Vec<String>,
    pub city_keywords: Vec<String>,
    pub street_keywords: Vec<String>,
    pub house_keywords: Vec<String>,
    /// Abreviação (ou forma completa) → forma canônica completa. Ex: `"ул" → "улица"`.
    pub street_types: BTreeMap<String, String>,
    /// Pontua os spans de rua em paralelo (rayon). O resultado é o mesmo do modo sequencial.
    pub parallel_street_scoring: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ParserSettings {
    fn default() -> Self {
        let street_types = [
            ("ул", "улица"),
            ("улица", "улица"),
            ("пр", "проспект"),
            ("пр-т", "проспект"),
            ("просп", "проспект"),
            ("проспект", "проспект"),
            ("пер", "переулок"),
            ("переулок", "переулок"),
            ("ш", "шоссе"),
            ("шоссе", "шоссе"),
            ("б-р", "бульвар"),
            ("бул", "бульвар"),
            ("бульвар", "бульвар"),
            ("пл", "площадь"),
            ("площадь", "площадь"),
            ("наб", "набережная"),
            ("набережная", "набережная"),
            ("проезд", "проезд"),
        ]
        .iter()
        .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
        .collect();

        Self {
            weights: EditWeights::default(),
            k_similar: 3,
            rerank: RerankMode::default(),
            separators: strings(&[",", ";", ":", "."]),
            city_keywords: strings(&["гор", "город", "поселок", "пос", "г"]),
            street_keywords: strings(&["ул", "улица", "проспект", "пр", "шоссе"]),
            house_keywords: strings(&["дом", "д"]),
            street_types,
            parallel_street_scoring: true,
        }
    }
}

impl ParserSettings {
    /// Lê a configuração de um JSON; campos ausentes ficam com o valor padrão.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Conjuntos de palavras-chave validados.
#[derive(Debug, Clone)]
pub struct KeywordSets {
    separators: Vec<char>,
    city: HashSet<String>,
    /// Qualquer marcador de rua (abreviação ou forma completa) → forma completa
    street_types: HashMap<String, String>,
    all: HashSet<String>,
    /// Formas completas distintas, em ordem alfabética
    full_street_types: Vec<String>,
}

fn normalized(items: &[String]) -> HashSet<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl KeywordSets {
    pub fn from_settings(settings: &ParserSettings) -> Result<Self> {
        if settings.separators.is_empty() {
            return Err(ParseError::Configuration(
                "separator set must not be empty".to_string(),
            ));
        }
        let mut separators = Vec::with_capacity(settings.separators.len());
        for sep in &settings.separators {
            let mut chars = sep.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_whitespace() => {
                    if !separators.contains(&c) {
                        separators.push(c);
                    }
                }
                _ => {
                    return Err(ParseError::Configuration(format!(
                        "separator elements must be single non-space characters, got {:?}",
                        sep
                    )))
                }
            }
        }

        let mut street_types: HashMap<String, String> = HashMap::new();
        for (abbr, full) in &settings.street_types {
            let abbr = abbr.trim().to_lowercase();
            let full = full.trim().to_lowercase();
            if abbr.is_empty() || full.is_empty() {
                return Err(ParseError::Configuration(
                    "street type mapping must not contain empty entries".to_string(),
                ));
            }
            street_types.insert(full.clone(), full.clone());
            street_types.insert(abbr, full);
        }
        // marcadores de rua sem mapeamento são a própria forma completa
        for keyword in normalized(&settings.street_keywords) {
            street_types.entry(keyword.clone()).or_insert(keyword);
        }
        if street_types.is_empty() {
            return Err(ParseError::Configuration(
                "at least one street type is required".to_string(),
            ));
        }

        let full_street_types: Vec<String> = street_types
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let city = normalized(&settings.city_keywords);
        let house = normalized(&settings.house_keywords);
        let all = city
            .iter()
            .chain(house.iter())
            .chain(street_types.keys())
            .cloned()
            .collect();

        Ok(Self {
            separators,
            city,
            street_types,
            all,
            full_street_types,
        })
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    /// Texto do token sem separadores no final (`"ул."` → `"ул"`).
    pub fn strip<'a>(&self, token: &'a str) -> &'a str {
        token.trim_end_matches(|c| self.separators.contains(&c))
    }

    pub fn is_keyword(&self, token: &str) -> bool {
        self.all.contains(self.strip(token))
    }

    pub fn is_city_keyword(&self, token: &str) -> bool {
        self.city.contains(self.strip(token))
    }

    /// Forma completa do tipo de rua marcado por `token`, se for um marcador de rua.
    pub fn street_type(&self, token: &str) -> Option<&str> {
        self.street_types.get(self.strip(token)).map(String::as_str)
    }

    pub fn full_street_types(&self) -> &[String] {
        &self.full_street_types
    }
}
