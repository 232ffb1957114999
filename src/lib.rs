//! # vcard_parser
//!
//! Библиотека для разбора файлов с контактными карточками (vCard) в плоские
//! записи с фиксированным набором колонок.
//!
//! Каждая карточка `BEGIN:VCARD ... END:VCARD` превращается в одну
//! [`types::Record`] из 16 строковых колонок: имя, категории, организация,
//! три адреса, шесть телефонов, три почтовых адреса и заметка. Поддерживаются
//! многострочные значения, экранированный текст и quoted-printable.
//!
//! Записи можно вывести в двух форматах:
//! * **Text** — построчно `Колонка: значение`, для просмотра в консоли;
//! * **CSV** — таблица с заголовком, для экспорта.
//!
//! ## Быстрый старт
//!
//! ```rust
//! use vcard_parser::{parse_from_vcard, dump_as_csv, types::Field};
//!
//! let data = "BEGIN:VCARD\n\
//!             FN:Jane\\, Doe\n\
//!             TEL;TYPE=CELL:555-1234\n\
//!             ADR;TYPE=HOME:;;123 Main St;Springfield;;;\n\
//!             END:VCARD\n";
//!
//! let records = parse_from_vcard(data.as_bytes())
//!     .collect::<Result<Vec<_>, _>>()
//!     .expect("Ошибка чтения");
//! assert_eq!(records[0].get(Field::HomeAddress), "123 Main St\nSpringfield");
//!
//! let mut writer = Vec::new();
//! dump_as_csv(&mut writer, &records, &Field::ALL).expect("Ошибка записи");
//! ```
//!
//! ## Обработка ошибок
//! Нераспознанные строки молча пропускаются. Ошибки бывают только при
//! чтении ([`error::ParseError`]) и записи ([`error::DumpError`]).

pub mod classifier;
pub mod decoder;
pub mod error;
pub mod types;

mod csv_format;
mod parser;
mod text_format;
mod utils;
mod vcard_format;

pub use parser::{dump, parse};

pub use vcard_format::{CardParser, RawLines, Records, parse_from_vcard, parse_lines};

pub use text_format::{RecordView, dump_as_text};

pub use csv_format::dump_as_csv;
