//! # Distância de Edição Ponderada
//!
//! Métrica discreta usada na recuperação grosseira de candidatos: custo mínimo
//! de inserções, remoções e substituições de um caractere para transformar
//! `source` em `target`, com custo configurável por operação.
//!
//! Os custos padrão (inserção 2, remoção 2, substituição 1) toleram erros de
//! digitação e diferenças de sufixo flexional melhor do que Levenshtein puro.
//!
//! A segunda métrica do motor, a distância euclidiana entre vetores de
//! frequência, fica em [`crate::vectorizer::FrequencyVector::euclidean`].

use serde::{Deserialize, Serialize};

/// Custos das operações de edição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditWeights {
    /// Inserir em `source` um caractere de `target`.
    pub insertion: u32,
    /// Remover um caractere de `source`.
    pub deletion: u32,
    pub substitution: u32,
}

impl Default for EditWeights {
    fn default() -> Self {
        Self {
            insertion: 2,
            deletion: 2,
            substitution: 1,
        }
    }
}

/// Distância de edição ponderada (Wagner-Fischer com duas linhas).
///
/// ```
/// use addr_core::distance::{weighted_edit_distance, EditWeights};
///
/// let w = EditWeights::default();
/// assert_eq!(weighted_edit_distance("кот", "кит", &w), 1);
/// assert_eq!(weighted_edit_distance("кот", "кото", &w), 2);
/// ```
pub fn weighted_edit_distance(source: &str, target: &str, weights: &EditWeights) -> u32 {
    let s: Vec<char> = source.chars().collect();
    let t: Vec<char> = target.chars().collect();

    // prev[j] = custo de transformar s[..i-1] em t[..j]
    let mut prev: Vec<u32> = (0..=t.len() as u32).map(|j| j * weights.insertion).collect();
    let mut curr: Vec<u32> = vec![0; t.len() + 1];

    for i in 1..=s.len() {
        curr[0] = i as u32 * weights.deletion;
        for j in 1..=t.len() {
            let substitution = if s[i - 1] == t[j - 1] { 0 } else { weights.substitution };
            curr[j] = (prev[j] + weights.deletion)
                .min(curr[j - 1] + weights.insertion)
                .min(prev[j - 1] + substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = EditWeights::default();
        assert_eq!(weighted_edit_distance("", "", &w), 0);
        assert_eq!(weighted_edit_distance("абв", "", &w), 6);
        assert_eq!(weighted_edit_distance("", "абв", &w), 6);
        assert_eq!(weighted_edit_distance("москва", "москва", &w), 0);
        assert_eq!(weighted_edit_distance("масква", "москва", &w), 1);
    }

    #[test]
    fn test_typo_in_city() {
        let w = EditWeights::default();
        // substituição п→и + inserção do espaço
        assert_eq!(weighted_edit_distance("нпжнийновгород", "нижний новгород", &w), 3);
    }

    #[test]
    fn test_asymmetric_weights() {
        let w = EditWeights { insertion: 1, deletion: 5, substitution: 10 };
        assert_eq!(weighted_edit_distance("аб", "абв", &w), 1);
        assert_eq!(weighted_edit_distance("абв", "аб", &w), 5);
        // substituição mais cara que remover + inserir
        assert_eq!(weighted_edit_distance("а", "б", &w), 6);
    }
}
