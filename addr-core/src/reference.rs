//! # Base de Referência
//!
//! Listas ordenadas de nomes de cidades e de ruas contra as quais os spans de
//! tokens são ranqueados. A carga a partir de arquivos tabulares fica com quem
//! chama; aqui só se normaliza (minúsculas, sem espaços nas bordas) e valida.
//!
//! Entradas de rua seguem o formato `"<nome> <tipo completo>"`, o mesmo que os
//! spans candidatos montam: `"родниковая улица"`, `"1-й кемеровский переулок"`.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Deserialização passa por [`ReferenceDatabase::new`]: normaliza e valida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReference")]
pub struct ReferenceDatabase {
    cities: Vec<String>,
    streets: Vec<String>,
}

/// Forma serializada, antes da validação.
#[derive(Deserialize)]
struct RawReference {
    cities: Vec<String>,
    streets: Vec<String>,
}

impl TryFrom<RawReference> for ReferenceDatabase {
    type Error = ParseError;

    fn try_from(raw: RawReference) -> Result<Self> {
        Self::new(raw.cities, raw.streets)
    }
}

fn normalize_entries<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn read_lines(reader: impl BufRead, what: &str) -> Result<Vec<String>> {
    reader
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| ParseError::Configuration(format!("can't read {}: {}", what, e)))
}

impl ReferenceDatabase {
    /// Cria a base; falha se alguma das listas ficar vazia após a normalização.
    pub fn new<C, S, T, U>(cities: C, streets: S) -> Result<Self>
    where
        C: IntoIterator<Item = T>,
        S: IntoIterator<Item = U>,
        T: AsRef<str>,
        U: AsRef<str>,
    {
        let cities = normalize_entries(cities);
        let streets = normalize_entries(streets);
        if cities.is_empty() {
            return Err(ParseError::Configuration(
                "city database is empty".to_string(),
            ));
        }
        if streets.is_empty() {
            return Err(ParseError::Configuration(
                "street database is empty".to_string(),
            ));
        }
        Ok(Self { cities, streets })
    }

    /// Lê duas listas com uma entrada por linha.
    pub fn from_readers(cities: impl BufRead, streets: impl BufRead) -> Result<Self> {
        Self::new(read_lines(cities, "city list")?, read_lines(streets, "street list")?)
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn streets(&self) -> &[String] {
        &self.streets
    }
}
