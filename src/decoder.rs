//! Декодеры значений свойств.
//!
//! Оба декодера трактуют `;` как разделитель частей значения и превращают
//! его в перевод строки.

use crate::types::Encoding;

const LF: u8 = 0x0A;
const CR: u8 = 0x0D;

/// Декодирует значение в указанной кодировке.
pub fn decode(payload: &str, encoding: Encoding) -> String {
    match encoding {
        Encoding::Text => decode_text(payload),
        Encoding::Hex => decode_quoted_printable(payload),
    }
}

/// Снимает экранирование с текстового значения.
///
/// Замены выполняются строго по порядку:
/// 1. `\,` → `,`
/// 2. `\:` → `:`
/// 3. `\n` → перевод строки
/// 4. `;` без `\` перед ним → перевод строки
/// 5. `\;` → `;`
///
/// ```rust
/// use vcard_parser::decoder::decode_text;
///
/// assert_eq!(decode_text(r"Jane\, Doe"), "Jane, Doe");
/// assert_eq!(decode_text(r"a;b\;c"), "a\nb;c");
/// ```
pub fn decode_text(payload: &str) -> String {
    let s = payload
        .replace(r"\,", ",")
        .replace(r"\:", ":")
        .replace(r"\n", "\n");
    replace_bare_semicolons(&s).replace(r"\;", ";")
}

fn replace_bare_semicolons(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev = None;
    for c in s.chars() {
        if c == ';' && prev != Some('\\') {
            result.push('\n');
        } else {
            result.push(c);
        }
        prev = Some(c);
    }
    result
}

/// Декодирует quoted-printable значение.
///
/// `;` сначала заменяется на `=0A`, затем поток режется по `=`. Каждый
/// токен из двух шестнадцатеричных цифр даёт один байт; `0D` отбрасывается.
/// Токены другой длины или с не-hex символами пропускаются.
///
/// ```rust
/// use vcard_parser::decoder::decode_quoted_printable;
///
/// assert_eq!(decode_quoted_printable("=48=65=6C=6C=6F"), "Hello");
/// ```
pub fn decode_quoted_printable(payload: &str) -> String {
    let stream = payload.replace(';', "=0A");
    let mut bytes = Vec::with_capacity(stream.len() / 3);
    for token in stream.split('=') {
        let Some(byte) = decode_hex_pair(token) else {
            continue;
        };
        match byte {
            CR => continue,
            LF => bytes.push(b'\n'),
            b => bytes.push(b),
        }
    }
    bytes_to_string(bytes)
}

fn decode_hex_pair(token: &str) -> Option<u8> {
    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

// Невалидный UTF-8 читается как Latin-1: байт в символ с тем же кодом.
pub(crate) fn bytes_to_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Убирает пустые части значения и склеивает остальные через перевод строки.
pub(crate) fn drop_empty_subparts(value: &str) -> String {
    value
        .split('\n')
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
