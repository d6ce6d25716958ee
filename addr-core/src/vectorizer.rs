//! # Vetor de Frequência de Símbolos
//!
//! Codifica uma palavra como um vetor de tamanho fixo: uma dimensão por símbolo
//! do alfabeto fechado (33 letras cirílicas minúsculas, espaço, hífen e os dígitos).
//! A ordem das letras é ignorada, então anagramas produzem vetores idênticos.
//!
//! | Faixa   | Símbolos        |
//! |---------|-----------------|
//! | 0..=31  | `а`..=`я`       |
//! | 32      | `ё`             |
//! | 33      | espaço          |
//! | 34      | `-`             |
//! | 35..=44 | `0`..=`9`       |

use crate::error::{ParseError, Result};

/// Número de dimensões do vetor.
pub const ALPHABET_SIZE: usize = 45;

/// Índice de um símbolo no alfabeto, ou `None` se ele não pertence ao alfabeto.
pub fn symbol_index(symbol: char) -> Option<usize> {
    match symbol {
        'а'..='я' => Some(symbol as usize - 'а' as usize),
        'ё' => Some(32),
        ' ' => Some(33),
        '-' => Some(34),
        '0'..='9' => Some(35 + (symbol as usize - '0' as usize)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyVector {
    counts: Vec<f64>,
}

impl FrequencyVector {
    /// Vetoriza uma palavra já em minúsculas.
    ///
    /// Falha com [`ParseError::UnsupportedSymbol`] no primeiro caractere fora do alfabeto.
    pub fn from_word(word: &str) -> Result<Self> {
        let mut counts = vec![0.0; ALPHABET_SIZE];
        for symbol in word.chars() {
            let idx = symbol_index(symbol).ok_or_else(|| ParseError::UnsupportedSymbol {
                symbol,
                word: word.to_string(),
            })?;
            counts[idx] += 1.0;
        }
        Ok(Self { counts })
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Distância euclidiana entre dois vetores de frequência.
    ///
    /// $$ d(a, b) = \sqrt{\sum_i (a_i - b_i)^2} $$
    pub fn euclidean(&self, other: &FrequencyVector) -> f64 {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_index_covers_alphabet() {
        assert_eq!(symbol_index('а'), Some(0));
        assert_eq!(symbol_index('я'), Some(31));
        assert_eq!(symbol_index('ё'), Some(32));
        assert_eq!(symbol_index('9'), Some(44));
        assert_eq!(symbol_index('.'), None);
        assert_eq!(symbol_index('A'), None);
    }

    #[test]
    fn test_anagrams_share_vector() {
        let a = FrequencyVector::from_word("ленина").unwrap();
        let b = FrequencyVector::from_word("нилена").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.euclidean(&b), 0.0);
    }

    #[test]
    fn test_counts() {
        let v = FrequencyVector::from_word("1-й дом").unwrap();
        assert_eq!(v.counts()[symbol_index('1').unwrap()], 1.0);
        assert_eq!(v.counts()[symbol_index('-').unwrap()], 1.0);
        assert_eq!(v.counts()[symbol_index(' ').unwrap()], 1.0);
        assert_eq!(v.counts()[symbol_index('д').unwrap()], 1.0);
        assert_eq!(v.counts().iter().sum::<f64>(), 7.0);
    }

    #[test]
    fn test_unsupported_symbol() {
        let err = FrequencyVector::from_word("г.").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedSymbol { symbol: '.', word: "г.".to_string() }
        );
    }

    #[test]
    fn test_euclidean() {
        let a = FrequencyVector::from_word("аа").unwrap();
        let b = FrequencyVector::from_word("бб").unwrap();
        assert!((a.euclidean(&b) - 8.0_f64.sqrt()).abs() < 1e-12);
    }
}
