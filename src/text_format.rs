use crate::error::DumpError;
use crate::parser::Dumper;
use crate::types::{Field, Record};
use core::fmt;
use std::{
    borrow::Borrow,
    io::{self, Write},
};

/// Представление записи с выбранным набором колонок.
///
/// Каждая колонка выводится строкой `Имя: значение`. Строки многострочного
/// значения, начиная со второй, сдвигаются на два пробела.
pub struct RecordView<'a> {
    record: &'a Record,
    columns: &'a [Field],
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a Record, columns: &'a [Field]) -> Self {
        RecordView { record, columns }
    }
}

impl fmt::Display for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.columns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}:", field.name())?;
            let mut lines = self.record.get(*field).split('\n');
            if let Some(first) = lines.next().filter(|l| !l.is_empty()) {
                write!(f, " {}", first)?;
            }
            for line in lines {
                write!(f, "\n  {}", line)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&RecordView::new(self, &Field::ALL), f)
    }
}

pub(crate) struct TextDumper;

impl Dumper for TextDumper {
    fn dump<W, I>(writer: &mut W, records: I, columns: &[Field]) -> Result<(), DumpError>
    where
        W: io::Write,
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        let mut w = io::BufWriter::new(writer);
        for (i, record) in records.into_iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            writeln!(w, "{}", RecordView::new(record.borrow(), columns))?;
        }
        w.flush()?;
        Ok(())
    }
}

/// Выводит записи в читаемом текстовом виде, разделяя их пустой строкой.
///
/// # Пример
///
/// ```rust
/// use vcard_parser::{dump_as_text, types::{Field, Record}};
///
/// let mut record = Record::new();
/// record.set(Field::FullName, "Jane Doe".to_string());
///
/// let mut buffer = Vec::new();
/// dump_as_text(&mut buffer, [&record], &[Field::FullName, Field::Email]).expect("Ошибка записи");
///
/// assert_eq!(String::from_utf8(buffer).unwrap(), "FullName: Jane Doe\nEmail:\n");
/// ```
pub fn dump_as_text<W, I>(writer: &mut W, records: I, columns: &[Field]) -> Result<(), DumpError>
where
    W: io::Write,
    I: IntoIterator,
    I::Item: Borrow<Record>,
{
    TextDumper::dump(writer, records, columns)
}
