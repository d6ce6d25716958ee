//! # Erros do Parser de Endereços
//!
//! Qualquer erro aborta a análise da linha atual inteira: não existe registro
//! parcial. Índice e casa nunca falham (usam sentinela / ficam vazios); cidade
//! e rua falham porque quem consome o registro espera esses campos.

use thiserror::Error;

/// Alias de resultado usado em todo o crate.
pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Configuração inválida: separadores malformados, listas de referência vazias, `k` nulo.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Um caractere fora do alfabeto do vetorizador apareceu em uma palavra pontuada.
    #[error("unsupported symbol {symbol:?} in {word:?}")]
    UnsupportedSymbol { symbol: char, word: String },

    /// Nenhum span de tokens produziu candidatos para a cidade.
    #[error("can't find city, please check the input string")]
    UnresolvedCity,

    /// Nenhum span de tokens produziu candidatos para a rua.
    #[error("ranking inconsistency: {0}")]
    RankingInconsistency(String),
}

impl ParseError {
    /// Nome curto do tipo de erro (para eventos e respostas HTTP)
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::Configuration(_) => "configuration",
            ParseError::UnsupportedSymbol { .. } => "unsupported_symbol",
            ParseError::UnresolvedCity => "unresolved_city",
            ParseError::RankingInconsistency(_) => "ranking_inconsistency",
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Configuration(err.to_string())
    }
}
