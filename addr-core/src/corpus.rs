//! # Dados de Demonstração
//!
//! Uma pequena base de cidades e ruas russas e as linhas de endereço usadas nos
//! exemplos e no servidor web quando nenhuma lista externa é fornecida.
//!
//! As linhas cobrem os casos difíceis que o parser precisa aguentar:
//! - separadores misturados (`;` `:` `,` `.`)
//! - marcadores opcionais (`г.`, `ул.`, `д.`)
//! - erros de digitação (`НпжнийНовгород`, `Масква`, `Ростов-на-Улду`)
//!
//! Quatro das nove linhas misturam separadores de forma que `;` ou `:` ficam
//! dentro de um token ranqueado; a análise delas termina sempre em
//! [`crate::error::ParseError::UnsupportedSymbol`], mesmo quando uma janela
//! mais estreita já casava exatamente. Elas ficam na lista para exibir esse erro.

use crate::error::Result;
use crate::reference::ReferenceDatabase;

/// Cidades da base de demonstração
pub const DEMO_CITIES: &[&str] = &[
    "Москва",
    "Санкт-Петербург",
    "Нижний Новгород",
    "Великий Новгород",
    "Ростов-на-Дону",
    "Ростов",
    "Новосибирск",
    "Екатеринбург",
    "Казань",
    "Самара",
    "Омск",
    "Челябинск",
    "Уфа",
    "Пермь",
    "Волгоград",
    "Воронеж",
    "Красноярск",
    "Кемерово",
    "Нижний Тагил",
    "Орёл",
];

/// Ruas da base de demonstração, no formato `"<nome> <tipo completo>"`
pub const DEMO_STREETS: &[&str] = &[
    "Родниковая улица",
    "Дворовая улица",
    "Ленина улица",
    "Ленинский проспект",
    "Мира проспект",
    "Гагарина улица",
    "Садовая улица",
    "Советская улица",
    "Кирова улица",
    "Пушкина улица",
    "Нижегородская улица",
    "Новгородская улица",
    "Ростовская улица",
    "1-й Кемеровский переулок",
    "2-й Кемеровский переулок",
    "Кемеровская улица",
    "Тихий переулок",
    "Речной переулок",
    "Энтузиастов шоссе",
    "Варшавское шоссе",
    "Цветной бульвар",
    "Красная площадь",
    "Фонтанки набережная",
    "Соборный проезд",
];

/// Linhas de endereço de demonstração (ruidosas de propósito)
pub fn demo_addresses() -> Vec<&'static str> {
    vec![
        "Ростов-наУлду, ул Ленина 6а",
        "123456;Нижний Новгород:Дворовая,30",
        "Нижний Новгород:Дворовая,д. 30;123456",
        "улица Дворовая,123456;дом 30,Масква",
        "123456;Ул. Дворовая;30;Москва",
        "123456;НижнийНовгород:ул.Дворовая,30",
        "г. Нижний Новгород, ул. Родниковая, 6а, 123456",
        "гор. НпжнийНовгород, Родниковая 6а, 123456",
        "1-й кемеровский переулок,гор. Ростов-на-Улду,6а",
    ]
}

/// Base de referência de demonstração
pub fn demo_reference() -> Result<ReferenceDatabase> {
    ReferenceDatabase::new(DEMO_CITIES, DEMO_STREETS)
}
