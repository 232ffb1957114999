use std::{borrow::Borrow, io};

use crate::error::DumpError;
use crate::parser::Dumper;
use crate::types::{Field, Record};

pub(crate) struct CsvDumper;

impl Dumper for CsvDumper {
    fn dump<W, I>(writer: &mut W, records: I, columns: &[Field]) -> Result<(), DumpError>
    where
        W: io::Write,
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        let mut w = csv::Writer::from_writer(writer);
        write_title(&mut w, columns)?;
        for record in records {
            write_record(&mut w, record.borrow(), columns)?;
        }
        w.flush()?;
        Ok(())
    }
}

fn write_title<W: io::Write>(w: &mut csv::Writer<W>, columns: &[Field]) -> Result<(), DumpError> {
    w.write_record(columns.iter().map(|field| field.name()))?;
    Ok(())
}

fn write_record<W: io::Write>(
    w: &mut csv::Writer<W>,
    record: &Record,
    columns: &[Field],
) -> Result<(), DumpError> {
    w.write_record(columns.iter().map(|field| record.get(*field)))?;
    Ok(())
}

/// Сериализует записи в CSV, записывая результат в `writer`.
///
/// Первая строка содержит имена колонок. Значения с запятыми, кавычками и
/// переводами строк берутся в кавычки.
///
/// # Аргументы
///
/// * `writer` - Приемник данных: файл, буфер в памяти (`Vec<u8>`) и т.п.
/// * `records` - Записи для вывода.
/// * `columns` - Колонки в нужном порядке, обычно [`Field::ALL`].
///
/// # Ошибки
///
/// Возвращает [`DumpError`], если запись во `writer` завершилась ошибкой.
///
/// # Пример
///
/// ```rust
/// use vcard_parser::{dump_as_csv, types::{Field, Record}};
///
/// let mut record = Record::new();
/// record.set(Field::FullName, "Doe, Jane".to_string());
/// record.set(Field::CellPhone, "555-1234".to_string());
///
/// let mut buffer = Vec::new();
/// dump_as_csv(&mut buffer, [&record], &[Field::FullName, Field::CellPhone]).expect("Ошибка записи");
///
/// let result_string = String::from_utf8(buffer).expect("Невалидный UTF-8");
/// assert_eq!(result_string, "FullName,CellPhone\n\"Doe, Jane\",555-1234\n");
/// ```
pub fn dump_as_csv<W, I>(writer: &mut W, records: I, columns: &[Field]) -> Result<(), DumpError>
where
    W: io::Write,
    I: IntoIterator,
    I::Item: Borrow<Record>,
{
    CsvDumper::dump(writer, records, columns)
}
