//! Классификация строк файла с карточками.
//!
//! Классификатор не хранит состояния: он смотрит на одну строку и решает,
//! открывает ли она карточку, закрывает её, продолжает предыдущее свойство
//! или начинает новое. Выбор слота для телефона без типа остаётся за
//! [`crate::CardParser`].

use crate::types::{Encoding, Field};
use crate::utils::{split_first_colon, strip_group};

/// Чем была открыта карточка.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMarker {
    /// `BEGIN:VCARD`
    Begin,
    /// `PRODID:...`, встречается у некоторых программ вместо `BEGIN`.
    ProductId,
}

/// Куда попадёт значение свойства.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Column(Field),
    /// Телефон без распознанного `TYPE`: следующий свободный из `Phone1..3`.
    UnknownPhone,
    /// Фото распознаётся, но в запись не попадает.
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    StartOfRecord(StartMarker),
    EndOfRecord,
    Continuation,
    FieldStart {
        target: Target,
        encoding: Encoding,
        payload: &'a str,
    },
    Unrecognized,
}

/// Параметры свойства, влияющие на разбор.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Params {
    cell: bool,
    work: bool,
    home: bool,
    quoted_printable: bool,
}

impl Params {
    fn parse(s: &str) -> Self {
        let mut params = Params::default();
        for token in s.split(';').filter(|t| !t.is_empty()) {
            let token = token.trim().to_ascii_uppercase();
            match token.split_once('=') {
                Some(("TYPE", values)) => {
                    for value in values.trim_matches('"').split(',') {
                        params.apply_bare(value.trim());
                    }
                }
                Some(("ENCODING", value)) => {
                    params.quoted_printable |= value.trim() == "QUOTED-PRINTABLE";
                }
                Some(_) => {}
                None => params.apply_bare(&token),
            }
        }
        params
    }

    // vCard 2.1 допускает параметры без имени: `TEL;CELL;QUOTED-PRINTABLE:`.
    fn apply_bare(&mut self, token: &str) {
        match token {
            "CELL" => self.cell = true,
            "WORK" => self.work = true,
            "HOME" => self.home = true,
            "QUOTED-PRINTABLE" => self.quoted_printable = true,
            _ => {}
        }
    }

    fn encoding(&self) -> Encoding {
        if self.quoted_printable {
            Encoding::Hex
        } else {
            Encoding::Text
        }
    }
}

struct PropertyRule {
    name: &'static str,
    resolve: fn(&Params) -> Target,
}

/// Распознаваемые свойства. Имя сравнивается целиком, без учёта регистра.
static PROPERTY_RULES: &[PropertyRule] = &[
    PropertyRule {
        name: "PHOTO",
        resolve: photo,
    },
    PropertyRule {
        name: "FN",
        resolve: full_name,
    },
    PropertyRule {
        name: "ORG",
        resolve: organization,
    },
    PropertyRule {
        name: "ADR",
        resolve: address,
    },
    PropertyRule {
        name: "TEL",
        resolve: phone,
    },
    PropertyRule {
        name: "EMAIL",
        resolve: email,
    },
    PropertyRule {
        name: "NOTE",
        resolve: note,
    },
    PropertyRule {
        name: "CATEGORIES",
        resolve: categories,
    },
];

fn photo(_: &Params) -> Target {
    Target::Photo
}

fn full_name(_: &Params) -> Target {
    Target::Column(Field::FullName)
}

fn organization(_: &Params) -> Target {
    Target::Column(Field::Organization)
}

fn note(_: &Params) -> Target {
    Target::Column(Field::Note)
}

fn categories(_: &Params) -> Target {
    Target::Column(Field::Categories)
}

fn phone(params: &Params) -> Target {
    if params.cell {
        Target::Column(Field::CellPhone)
    } else if params.work {
        Target::Column(Field::WorkPhone)
    } else if params.home {
        Target::Column(Field::HomePhone)
    } else {
        Target::UnknownPhone
    }
}

fn address(params: &Params) -> Target {
    if params.work {
        Target::Column(Field::WorkAddress)
    } else if params.home {
        Target::Column(Field::HomeAddress)
    } else {
        Target::Column(Field::Address)
    }
}

fn email(params: &Params) -> Target {
    if params.work {
        Target::Column(Field::WorkEmail)
    } else if params.home {
        Target::Column(Field::HomeEmail)
    } else {
        Target::Column(Field::Email)
    }
}

/// Определяет, что делать со строкой.
///
/// Значение свойства берётся после первого двоеточия, дальнейшие двоеточия
/// остаются его частью.
///
/// ```rust
/// use vcard_parser::classifier::{classify, LineKind, Target};
/// use vcard_parser::types::{Encoding, Field};
///
/// assert_eq!(
///     classify("item1.TEL;TYPE=WORK:555-0100"),
///     LineKind::FieldStart {
///         target: Target::Column(Field::WorkPhone),
///         encoding: Encoding::Text,
///         payload: "555-0100",
///     }
/// );
/// ```
pub fn classify(line: &str) -> LineKind<'_> {
    if line.starts_with([' ', '=']) {
        return LineKind::Continuation;
    }

    let (head, payload) = split_first_colon(line);
    let head = strip_group(head.trim());
    let (name, params) = head.split_once(';').unwrap_or((head, ""));

    if name.eq_ignore_ascii_case("BEGIN") && payload.trim().eq_ignore_ascii_case("VCARD") {
        return LineKind::StartOfRecord(StartMarker::Begin);
    }
    if name.eq_ignore_ascii_case("END") && payload.trim().eq_ignore_ascii_case("VCARD") {
        return LineKind::EndOfRecord;
    }
    if name.eq_ignore_ascii_case("PRODID") {
        return LineKind::StartOfRecord(StartMarker::ProductId);
    }

    let Some(rule) = PROPERTY_RULES
        .iter()
        .find(|rule| name.eq_ignore_ascii_case(rule.name))
    else {
        return LineKind::Unrecognized;
    };

    let params = Params::parse(params);
    LineKind::FieldStart {
        target: (rule.resolve)(&params),
        encoding: params.encoding(),
        payload,
    }
}
