//! # Tokenizador de Endereços
//!
//! Divide a linha bruta em uma sequência plana de tokens limpos e em minúsculas.
//!
//! ## Política de separador único
//!
//! Entre os separadores configurados (ex: `,` `;` `:` `.`), escolhe-se **apenas
//! o mais frequente** na linha; só as ocorrências dele viram espaço. Os demais
//! separadores continuam grudados nos tokens (`"г."`, `"москва:дворовая"`).
//! É uma heurística: entradas que misturam separadores de forma inconsistente
//! deixam pontuação dentro dos tokens, e isso fica visível para as etapas seguintes.
//!
//! ```rust
//! use addr_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("г. Нижний Новгород, ул. Родниковая, 6а", &[',', ';', ':', '.']);
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["г.", "нижний", "новгород", "ул.", "родниковая", "6а"]);
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído da linha de endereço.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Texto limpo, em minúsculas, nunca vazio.
    pub text: String,
    /// Posição do token na sequência recém tokenizada (0, 1, 2...).
    /// Não muda quando outros tokens são removidos pelos extratores.
    pub position: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Escolhe o separador dominante: maior contagem, empate resolvido pela ordem configurada.
///
/// Retorna `None` se nenhum separador aparece na linha.
pub fn dominant_separator(line: &str, separators: &[char]) -> Option<char> {
    let mut best: Option<(char, usize)> = None;
    for &sep in separators {
        let count = line.chars().filter(|&c| c == sep).count();
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((sep, count)),
        }
    }
    best.map(|(sep, _)| sep)
}

/// Tokeniza uma linha de endereço.
pub fn tokenize(line: &str, separators: &[char]) -> Vec<Token> {
    let replaced: String = match dominant_separator(line, separators) {
        Some(sep) => line
            .chars()
            .map(|c| if c == sep { ' ' } else { c })
            .collect(),
        None => line.to_string(),
    };

    replaced
        .split_whitespace()
        .map(|piece| piece.trim().to_lowercase())
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(i, text)| Token::new(text, i))
        .collect()
}

/// Remove de uma só vez os tokens cujos índices (na fatia atual) estão em `indices`.
///
/// Os extratores apenas *leem* a sequência e devolvem a lista de remoção;
/// a reconstrução acontece aqui, em um único passo.
pub fn remove_indices(tokens: &mut Vec<Token>, indices: &[usize]) {
    if indices.is_empty() {
        return;
    }
    let mut i = 0;
    tokens.retain(|_| {
        let keep = !indices.contains(&i);
        i += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEPARATORS: &[char] = &[',', ';', ':', '.'];

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_dominant_separator_only() {
        let tokens = tokenize("г. Нижний Новгород, ул. Родниковая, 6а, 123456", SEPARATORS);
        // ',' aparece 3 vezes, '.' só 2: os pontos ficam grudados
        assert_eq!(
            texts(&tokens),
            ["г.", "нижний", "новгород", "ул.", "родниковая", "6а", "123456"]
        );
    }

    #[test]
    fn test_tokenize_tie_uses_configured_order() {
        let tokens = tokenize("123456;Нижний Новгород:Дворовая,30", SEPARATORS);
        // empate 1-1-1: vence ',' (primeiro da lista)
        assert_eq!(texts(&tokens), ["123456;нижний", "новгород:дворовая", "30"]);
    }

    #[test]
    fn test_tokenize_no_separator() {
        let tokens = tokenize("  Москва   Ленина 5 ", SEPARATORS);
        assert_eq!(texts(&tokens), ["москва", "ленина", "5"]);
    }

    #[test]
    fn test_tokenize_never_yields_empty_tokens() {
        let tokens = tokenize(",,, ;; , ул,,Ленина,,", SEPARATORS);
        assert!(tokens.iter().all(|t| !t.text.is_empty()));
        assert_eq!(texts(&tokens), [";;", "ул", "ленина"]);
        assert!(tokenize("", SEPARATORS).is_empty());
        assert!(tokenize(",,,", SEPARATORS).is_empty());
    }

    #[test]
    fn test_positions_are_sequential() {
        let tokens = tokenize("a,b,c", SEPARATORS);
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, [0, 1, 2]);
    }

    #[test]
    fn test_remove_indices_single_rebuild() {
        let mut tokens = tokenize("а б в г д", SEPARATORS);
        remove_indices(&mut tokens, &[3, 0]);
        assert_eq!(texts(&tokens), ["б", "в", "д"]);
        assert_eq!(tokens[2].position, 4);
    }
}
