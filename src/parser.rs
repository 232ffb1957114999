//! Модуль верхнего уровня для чтения карточек и вывода записей.
//!
//! Предоставляет единый интерфейс через функции [`parse`] и [`dump`].

use crate::vcard_format::{RawLines, Records};
use crate::{error, types};
use std::{borrow::Borrow, io};

/// Трейт, который реализуют все форматы вывода.
pub(crate) trait Dumper {
    /// Записывает записи в поток, выводя только перечисленные колонки.
    fn dump<W, I>(
        writer: &mut W,
        records: I,
        columns: &[types::Field],
    ) -> Result<(), error::DumpError>
    where
        W: io::Write,
        I: IntoIterator,
        I::Item: Borrow<types::Record>;
}

/// Читает карточки из предоставленного потока.
///
/// ## Аргументы
///
/// * `reader` - Поток ввода, откуда будут читаться строки (файл или буфер).
///
/// ## Возвращаемое значение
///
/// Ленивая последовательность записей [`types::Record`]. Элемент с ошибкой
/// [`error::ParseError`] появляется только при сбое чтения.
///
/// # Пример
///
/// ```no_run
/// use std::fs::File;
/// use vcard_parser::parse;
///
/// let file = File::open("contacts.vcf").expect("Файл не найден");
/// for record in parse(file) {
///     println!("{}", record.expect("Ошибка чтения"));
/// }
/// ```
pub fn parse<R: io::Read>(reader: R) -> Records<RawLines<io::BufReader<R>>> {
    crate::vcard_format::parse_from_vcard(reader)
}

/// Записывает записи в предоставленный поток в указанном формате.
///
/// ## Аргументы
///
/// * `writer` - Поток вывода.
/// * `format` - Целевой формат (см. [`types::SupportedFileFormat`]).
/// * `records` - Записи для вывода.
/// * `columns` - Колонки в порядке вывода.
///
/// # Пример
///
/// ```rust
/// use vcard_parser::{dump, parse, types::{Field, SupportedFileFormat}};
///
/// let data = "BEGIN:VCARD\nFN:Jane\nEMAIL;TYPE=HOME:jane@example.com\nEND:VCARD\n";
/// let records = parse(data.as_bytes())
///     .collect::<Result<Vec<_>, _>>()
///     .expect("Ошибка чтения");
///
/// let mut buffer = Vec::new();
/// dump(&mut buffer, SupportedFileFormat::Csv, &records, &[Field::FullName, Field::HomeEmail])
///     .expect("Ошибка записи");
///
/// let result_string = String::from_utf8(buffer).expect("Невалидный UTF-8");
/// assert_eq!(result_string, "FullName,HomeEmail\nJane,jane@example.com\n");
/// ```
pub fn dump<W, I>(
    writer: &mut W,
    format: types::SupportedFileFormat,
    records: I,
    columns: &[types::Field],
) -> Result<(), error::DumpError>
where
    W: io::Write,
    I: IntoIterator,
    I::Item: Borrow<types::Record>,
{
    match format {
        types::SupportedFileFormat::Text => {
            crate::text_format::TextDumper::dump(writer, records, columns)
        }
        types::SupportedFileFormat::Csv => {
            crate::csv_format::CsvDumper::dump(writer, records, columns)
        }
    }
}
