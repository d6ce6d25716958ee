//! # addr-core — Parser de Endereços Postais Russos
//!
//! Transforma linhas de endereço livres e ruidosas em registros estruturados:
//! índice postal, cidade, rua e número da casa. Cidade e rua são resolvidas por
//! busca difusa contra uma base de referência e saem como distribuições de
//! probabilidade sobre candidatos.
//!
//! ## Arquitetura
//!
//! 1.  **Tokenização** ([`tokenizer`]): separador dominante, minúsculas, sem tokens vazios.
//! 2.  **Extração** ([`extract`]): Índice → Rua → Casa → Cidade; cada extrator
//!     consome os tokens que usou.
//! 3.  **Busca de spans** ([`span`]): janelas ao redor de palavras-chave (ou livres),
//!     ranqueadas pelo [`ranker`].
//! 4.  **Ranqueamento** ([`ranker`]): shortlist por distância de edição ponderada
//!     ([`distance`]) e reordenação por vetores de frequência ([`vectorizer`]).
//! 5.  **Saída**: [`AddressRecord`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use addr_core::{corpus, AddressParser};
//!
//! let parser = AddressParser::with_defaults(corpus::demo_reference().unwrap()).unwrap();
//! let record = parser.parse("123456;Ул. Дворовая;30;Москва").unwrap();
//!
//! assert_eq!(record.index, "123456");
//! assert_eq!(record.house.as_deref(), Some("30"));
//! assert_eq!(record.city.top_candidate(), Some("москва"));
//! assert_eq!(record.street.top_candidate(), Some("дворовая улица"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios e emite eventos.
//! - [`settings`]: Pesos, palavras-chave e tipos de rua configuráveis.
//! - [`reference`]: Listas de cidades e ruas.
//! - [`corpus`]: Base e endereços de demonstração.

pub mod corpus;
pub mod distance;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod ranker;
pub mod reference;
pub mod settings;
pub mod span;
pub mod tokenizer;
pub mod vectorizer;

pub use error::{ParseError, Result};
pub use pipeline::{AddressParser, AddressRecord, Field, ParseEvent, INDEX_NOT_IDENTIFIED};
pub use ranker::{CandidateGroup, CandidateSet, RerankMode};
pub use reference::ReferenceDatabase;
pub use settings::ParserSettings;
pub use tokenizer::Token;
