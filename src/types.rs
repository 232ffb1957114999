use crate::error::ParseError;
use std::str::FromStr;

/// Колонка выходной записи.
///
/// Порядок вариантов совпадает с порядком колонок при выводе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Categories,
    Organization,
    WorkAddress,
    HomeAddress,
    Address,
    CellPhone,
    WorkPhone,
    HomePhone,
    Phone1,
    Phone2,
    Phone3,
    WorkEmail,
    HomeEmail,
    Email,
    Note,
}

impl Field {
    pub const COUNT: usize = 16;

    /// Все колонки в порядке вывода.
    pub const ALL: [Field; Field::COUNT] = [
        Field::FullName,
        Field::Categories,
        Field::Organization,
        Field::WorkAddress,
        Field::HomeAddress,
        Field::Address,
        Field::CellPhone,
        Field::WorkPhone,
        Field::HomePhone,
        Field::Phone1,
        Field::Phone2,
        Field::Phone3,
        Field::WorkEmail,
        Field::HomeEmail,
        Field::Email,
        Field::Note,
    ];

    /// Слоты для телефонов без распознанного `TYPE`, в порядке заполнения.
    pub const UNKNOWN_PHONES: [Field; 3] = [Field::Phone1, Field::Phone2, Field::Phone3];

    pub fn name(self) -> &'static str {
        match self {
            Field::FullName => "FullName",
            Field::Categories => "Categories",
            Field::Organization => "Organization",
            Field::WorkAddress => "WorkAddress",
            Field::HomeAddress => "HomeAddress",
            Field::Address => "Address",
            Field::CellPhone => "CellPhone",
            Field::WorkPhone => "WorkPhone",
            Field::HomePhone => "HomePhone",
            Field::Phone1 => "Phone1",
            Field::Phone2 => "Phone2",
            Field::Phone3 => "Phone3",
            Field::WorkEmail => "WorkEmail",
            Field::HomeEmail => "HomeEmail",
            Field::Email => "Email",
            Field::Note => "Note",
        }
    }

    /// Колонки со структурным значением (адрес, организация): пустые
    /// части между `;` в них отбрасываются.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            Field::WorkAddress | Field::HomeAddress | Field::Address | Field::Organization
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Field {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| ParseError::UnknownField(s.to_string()))
    }
}

/// Способ кодирования значения свойства.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Обычный текст с экранированием через `\`.
    Text,
    /// Quoted-printable: последовательность `=XX`.
    Hex,
}

/// Одна контактная карточка, сведённая к фиксированному набору колонок.
///
/// Все поля по умолчанию пустые.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; Field::COUNT],
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: String) {
        self.values[field.index()] = value;
    }

    /// Пары `(колонка, значение)` в порядке вывода.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .iter()
            .map(move |field| (*field, self.get(*field)))
    }

    /// Значения в порядке колонок.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }
}

/// Поддерживаемые форматы вывода.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFileFormat {
    Text,
    Csv,
}
