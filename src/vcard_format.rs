//! Построчный разбор файла с контактными карточками.
//!
//! Значение свойства может занимать несколько строк, поэтому декодировать
//! его можно только когда встретилась следующая строка, не являющаяся
//! продолжением. До этого момента строки копятся в буфере открытого поля.

use std::io::{self, BufRead};
use std::mem;

use tracing::{debug, trace, warn};

use crate::classifier::{LineKind, StartMarker, Target, classify};
use crate::decoder::{bytes_to_string, decode, drop_empty_subparts};
use crate::error::ParseError;
use crate::types::{Encoding, Field, Record};
use crate::utils::strip_bom;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    /// `target == None`: значение читается, но никуда не записывается
    /// (фото, четвёртый телефон без типа).
    Accumulating {
        target: Option<Field>,
        encoding: Encoding,
        buffer: String,
    },
}

/// Конечный автомат разбора карточек.
///
/// Получает строки по одной через [`CardParser::feed`] и отдаёт готовую
/// запись на строке `END:VCARD`.
#[derive(Debug, Default)]
pub struct CardParser {
    record: Option<Record>,
    state: State,
    unknown_phones: usize,
    line_number: usize,
}

impl CardParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Обрабатывает очередную строку. Возвращает запись, если строка
    /// завершила карточку.
    pub fn feed(&mut self, line: &str) -> Option<Record> {
        self.line_number += 1;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let kind = classify(line);
        if kind == LineKind::Continuation {
            self.continue_field(line);
            return None;
        }

        self.flush();
        match kind {
            LineKind::StartOfRecord(marker) => {
                self.start_record(marker);
                None
            }
            LineKind::EndOfRecord => self.end_record(),
            LineKind::FieldStart {
                target,
                encoding,
                payload,
            } => {
                self.open_field(target, encoding, payload);
                None
            }
            LineKind::Unrecognized | LineKind::Continuation => {
                trace!(line = self.line_number, "skipping unrecognized line");
                None
            }
        }
    }

    /// Завершает разбор. Незакрытая карточка отбрасывается.
    pub fn finish(&mut self) {
        self.flush();
        if self.record.take().is_some() {
            warn!(
                line = self.line_number,
                "input ended inside a card without END:VCARD, card dropped"
            );
        }
        self.unknown_phones = 0;
    }

    fn continue_field(&mut self, line: &str) {
        let State::Accumulating {
            encoding, buffer, ..
        } = &mut self.state
        else {
            trace!(line = self.line_number, "continuation line without open field");
            return;
        };

        match (*encoding, line.as_bytes().first()) {
            (Encoding::Text, Some(b' ')) => buffer.push_str(&line[1..]),
            (Encoding::Hex, Some(b'=')) => buffer.push_str(line),
            _ => trace!(
                line = self.line_number,
                "continuation line does not match field encoding"
            ),
        }
    }

    fn flush(&mut self) {
        let State::Accumulating {
            target,
            encoding,
            buffer,
        } = mem::take(&mut self.state)
        else {
            return;
        };
        let Some(field) = target else {
            return;
        };

        let decoded = decode(&buffer, encoding);
        let value = if field.is_structured() {
            drop_empty_subparts(&decoded)
        } else {
            decoded
        };
        self.record
            .get_or_insert_with(Record::new)
            .set(field, value);
    }

    fn start_record(&mut self, marker: StartMarker) {
        match marker {
            StartMarker::Begin => {
                if self.record.is_some() {
                    warn!(
                        line = self.line_number,
                        "BEGIN:VCARD inside an open card, previous card dropped"
                    );
                }
                self.open_record();
            }
            // PRODID не сбрасывает уже прочитанные поля открытой карточки.
            StartMarker::ProductId => {
                if self.record.is_none() {
                    self.open_record();
                }
            }
        }
    }

    fn open_record(&mut self) {
        debug!(line = self.line_number, "card started");
        self.record = Some(Record::new());
        self.unknown_phones = 0;
    }

    fn end_record(&mut self) -> Option<Record> {
        self.unknown_phones = 0;
        let record = self.record.take();
        match &record {
            Some(record) => debug!(
                line = self.line_number,
                full_name = record.get(Field::FullName),
                "card completed"
            ),
            None => trace!(line = self.line_number, "END:VCARD without open card"),
        }
        record
    }

    fn open_field(&mut self, target: Target, encoding: Encoding, payload: &str) {
        if self.record.is_none() {
            debug!(line = self.line_number, "property outside a card, card opened");
            self.open_record();
        }
        let target = self.resolve(target);
        self.state = State::Accumulating {
            target,
            encoding,
            buffer: payload.to_string(),
        };
    }

    fn resolve(&mut self, target: Target) -> Option<Field> {
        match target {
            Target::Column(field) => Some(field),
            Target::Photo => None,
            Target::UnknownPhone => {
                let slot = Field::UNKNOWN_PHONES.get(self.unknown_phones).copied();
                match slot {
                    Some(_) => self.unknown_phones += 1,
                    None => warn!(
                        line = self.line_number,
                        "no free slot for untyped phone number, value dropped"
                    ),
                }
                slot
            }
        }
    }
}

/// Строки потока без требования валидного UTF-8.
///
/// Строка с невалидным UTF-8 читается как Latin-1 и разбирается дальше,
/// а не обрывает чтение файла.
pub struct RawLines<B> {
    reader: B,
}

impl<B: BufRead> RawLines<B> {
    pub fn new(reader: B) -> Self {
        RawLines { reader }
    }
}

impl<B: BufRead> Iterator for RawLines<B> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(bytes_to_string(buf)))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Ленивая последовательность карточек поверх источника строк.
pub struct Records<I> {
    lines: I,
    parser: CardParser,
    started: bool,
    done: bool,
}

impl<I> Records<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Records {
            lines,
            parser: CardParser::new(),
            started: false,
            done: false,
        }
    }
}

impl<I> Iterator for Records<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            };
            let line = if self.started {
                line.as_str()
            } else {
                self.started = true;
                strip_bom(&line)
            };
            if let Some(record) = self.parser.feed(line) {
                return Some(Ok(record));
            }
        }
        self.done = true;
        self.parser.finish();
        None
    }
}

/// Читает карточки из потока.
///
/// Записи отдаются по мере чтения: каждая готова сразу после своей строки
/// `END:VCARD`.
///
/// # Ошибки
///
/// Элемент последовательности содержит [`ParseError`], если чтение из
/// `reader` завершилось ошибкой. После этого последовательность заканчивается.
///
/// # Пример
///
/// ```rust
/// use vcard_parser::{parse_from_vcard, types::Field};
///
/// let data = "BEGIN:VCARD\nFN:Jane\\, Doe\nTEL;TYPE=CELL:555-1234\nEND:VCARD\n";
///
/// let records: Vec<_> = parse_from_vcard(data.as_bytes())
///     .collect::<Result<_, _>>()
///     .expect("Ошибка чтения");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].get(Field::FullName), "Jane, Doe");
/// assert_eq!(records[0].get(Field::CellPhone), "555-1234");
/// ```
pub fn parse_from_vcard<R: io::Read>(reader: R) -> Records<RawLines<io::BufReader<R>>> {
    Records::new(RawLines::new(io::BufReader::new(reader)))
}

/// Разбирает уже разделённые на строки данные.
pub fn parse_lines<I, S>(lines: I) -> impl Iterator<Item = Record>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Records::new(
        lines
            .into_iter()
            .map(|line| -> io::Result<String> { Ok(line.into()) }),
    )
    .filter_map(Result::ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> Vec<Record> {
        parse_lines(lines.iter().copied()).collect()
    }

    fn only_field(record: &Record) -> Vec<(Field, String)> {
        record
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| (field, value.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_one_card() {
        let records = parse(&[
            "BEGIN:VCARD",
            r"FN:Jane\, Doe",
            "TEL;TYPE=CELL:555-1234",
            "ADR;TYPE=HOME:;;123 Main St;Springfield;;;",
            "END:VCARD",
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(
            only_field(&records[0]),
            vec![
                (Field::FullName, "Jane, Doe".to_string()),
                (Field::HomeAddress, "123 Main St\nSpringfield".to_string()),
                (Field::CellPhone, "555-1234".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_printable_note() {
        let records = parse(&[
            "BEGIN:VCARD",
            "NOTE;ENCODING=QUOTED-PRINTABLE:=48=65=6C=6C=6F",
            "END:VCARD",
        ]);
        assert_eq!(records[0].get(Field::Note), "Hello");
    }

    #[test]
    fn test_text_continuation_strips_one_leading_space() {
        let records = parse(&["BEGIN:VCARD", "NOTE:hello", "  world", "END:VCARD"]);
        assert_eq!(records[0].get(Field::Note), "hello world");
    }

    #[test]
    fn test_single_space_fold_joins_without_space() {
        // Снимается ровно один пробел, поэтому ` world` склеивается вплотную
        // (а не в `hello world`).
        let records = parse(&["BEGIN:VCARD", "NOTE:hello", " world", "END:VCARD"]);
        assert_eq!(records[0].get(Field::Note), "helloworld");
    }

    #[test]
    fn test_note_keeps_blank_lines() {
        let records = parse(&[
            "BEGIN:VCARD",
            r"NOTE:para1\n\npara2",
            "FN:Jane;;Doe",
            "CATEGORIES:a; ;b",
            "END:VCARD",
        ]);
        assert_eq!(records[0].get(Field::Note), "para1\n\npara2");
        assert_eq!(records[0].get(Field::FullName), "Jane\n\nDoe");
        assert_eq!(records[0].get(Field::Categories), "a\n \nb");
    }

    #[test]
    fn test_structured_fields_drop_empty_parts() {
        let records = parse(&[
            "BEGIN:VCARD",
            "ORG:Acme;;Research;",
            "ADR:;;1 St; ;Town;;",
            "END:VCARD",
        ]);
        assert_eq!(records[0].get(Field::Organization), "Acme\nResearch");
        assert_eq!(records[0].get(Field::Address), "1 St\nTown");
    }

    #[test]
    fn test_hex_continuation_keeps_whole_line() {
        let records = parse(&[
            "BEGIN:VCARD",
            "NOTE;ENCODING=QUOTED-PRINTABLE:=48=65=",
            "=6C=6C=6F",
            "END:VCARD",
        ]);
        assert_eq!(records[0].get(Field::Note), "Hello");
    }

    #[test]
    fn test_continuation_with_wrong_lead_is_discarded() {
        let records = parse(&[
            "BEGIN:VCARD",
            "NOTE:hello",
            "=20there",
            " world",
            "TEL;ENCODING=QUOTED-PRINTABLE:=35=35",
            " ignored",
            "=35",
            "END:VCARD",
        ]);
        assert_eq!(records[0].get(Field::Note), "helloworld");
        assert_eq!(records[0].get(Field::Phone1), "555");
    }

    #[test]
    fn test_continuation_without_open_field_is_discarded() {
        let records = parse(&[
            "BEGIN:VCARD",
            " orphan",
            "VERSION:3.0",
            " orphan",
            "END:VCARD",
        ]);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
    }

    #[test]
    fn test_unrecognized_line_closes_field() {
        let records = parse(&["BEGIN:VCARD", "NOTE:a", "X-CUSTOM:b", " c", "END:VCARD"]);
        assert_eq!(records[0].get(Field::Note), "a");
    }

    #[test]
    fn test_unknown_phones_fill_slots_and_drop_fourth() {
        let records = parse(&[
            "BEGIN:VCARD",
            "TEL:111",
            "TEL;TYPE=FAX:222",
            "TEL;TYPE=CELL:999",
            "item1.TEL:333",
            "TEL:444",
            "END:VCARD",
        ]);
        let record = &records[0];
        assert_eq!(record.get(Field::Phone1), "111");
        assert_eq!(record.get(Field::Phone2), "222");
        assert_eq!(record.get(Field::Phone3), "333");
        assert_eq!(record.get(Field::CellPhone), "999");
        assert!(record.values().iter().all(|value| value != "444"));
    }

    #[test]
    fn test_unknown_phone_counter_resets_per_card() {
        let records = parse(&[
            "BEGIN:VCARD",
            "TEL:1",
            "TEL:2",
            "END:VCARD",
            "BEGIN:VCARD",
            "TEL:3",
            "END:VCARD",
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get(Field::Phone1), "3");
        assert_eq!(records[1].get(Field::Phone2), "");
    }

    #[test]
    fn test_photo_is_consumed_but_not_stored() {
        let records = parse(&[
            "BEGIN:VCARD",
            "PHOTO;ENCODING=b;TYPE=JPEG:/9j/4AAQSkZJRgABAQ",
            " AAABAAEAAD/2wBDAAMCAgICAgMC",
            "FN:Jane",
            "END:VCARD",
        ]);
        assert_eq!(
            only_field(&records[0]),
            vec![(Field::FullName, "Jane".to_string())]
        );
    }

    #[test]
    fn test_end_flushes_open_field() {
        let records = parse(&["BEGIN:VCARD", "EMAIL;TYPE=WORK:jane@corp.example", "END:VCARD"]);
        assert_eq!(records[0].get(Field::WorkEmail), "jane@corp.example");
    }

    #[test]
    fn test_card_without_begin_is_opened_implicitly() {
        let records = parse(&["FN:Jane", "END:VCARD"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Field::FullName), "Jane");
    }

    #[test]
    fn test_no_markers_yield_no_records() {
        assert!(parse(&["FN:Jane", "TEL:555", "NOTE:x"]).is_empty());
        assert!(parse(&["PRODID:-//x//EN", "FN:Jane", "PRODID:-//y//EN", "FN:John"]).is_empty());
        assert!(parse(&[]).is_empty());
    }

    #[test]
    fn test_prodid_opens_card_only_when_none_is_open() {
        let records = parse(&[
            "BEGIN:VCARD",
            "FN:Jane",
            "PRODID:-//Apple Inc.//iOS//EN",
            "TEL;TYPE=CELL:1",
            "END:VCARD",
            "PRODID:-//x//EN",
            "FN:John",
            "END:VCARD",
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Field::FullName), "Jane");
        assert_eq!(records[0].get(Field::CellPhone), "1");
        assert_eq!(records[1].get(Field::FullName), "John");
    }

    #[test]
    fn test_begin_resets_unterminated_card() {
        let records = parse(&["BEGIN:VCARD", "FN:Lost", "BEGIN:VCARD", "FN:Kept", "END:VCARD"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Field::FullName), "Kept");
    }

    #[test]
    fn test_later_line_for_same_field_overwrites() {
        let records = parse(&["BEGIN:VCARD", "EMAIL:a@x", "EMAIL:b@x", "END:VCARD"]);
        assert_eq!(records[0].get(Field::Email), "b@x");
    }

    #[test]
    fn test_crlf_and_bom_are_tolerated() {
        let data = "\u{feff}BEGIN:VCARD\r\nFN:Jane\r\nNOTE:a\r\n b\r\nEND:VCARD\r\n";
        let records: Vec<Record> = parse_from_vcard(data.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Field::FullName), "Jane");
        assert_eq!(records[0].get(Field::Note), "ab");
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_parsing() {
        let mut data = b"BEGIN:VCARD\nFN:A\nEND:VCARD\nBEGIN:VCARD\nFN:M".to_vec();
        data.push(0xFC);
        data.extend_from_slice(b"ller\nEND:VCARD\nBEGIN:VCARD\nFN:C\nEND:VCARD");

        let names: Vec<String> = parse_from_vcard(data.as_slice())
            .map(|record| record.unwrap().get(Field::FullName).to_string())
            .collect();
        assert_eq!(names, vec!["A", "Müller", "C"]);
    }

    #[test]
    fn test_raw_lines_strip_terminators() {
        let lines: Vec<String> = RawLines::new(&b"a\r\nb\n\nc"[..])
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let lines = [
            "BEGIN:VCARD",
            "TEL:1",
            "NOTE;QUOTED-PRINTABLE:=41;=42",
            "END:VCARD",
            "BEGIN:VCARD",
            "TEL:2",
            "END:VCARD",
        ];
        assert_eq!(parse(&lines), parse(&lines));
        assert_eq!(parse(&lines)[0].get(Field::Note), "A\nB");
    }

    #[test]
    fn test_records_are_yielded_lazily() {
        let mut records = parse_lines(
            ["BEGIN:VCARD", "FN:First", "END:VCARD", "BEGIN:VCARD", "FN:Second"]
                .into_iter()
                .chain(std::iter::once_with(|| -> &'static str {
                    panic!("second card must not be read before the first is returned")
                })),
        );
        let first = records.next().unwrap();
        assert_eq!(first.get(Field::FullName), "First");
    }

    #[test]
    fn test_read_error_ends_sequence() {
        let lines = vec![
            Ok("BEGIN:VCARD".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "broken")),
            Ok("END:VCARD".to_string()),
        ];
        let mut records = Records::new(lines.into_iter());
        assert!(matches!(records.next(), Some(Err(ParseError::IOError(_)))));
        assert!(records.next().is_none());
    }
}
