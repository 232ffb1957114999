const BOM: char = '\u{feff}';

pub(crate) fn strip_bom(s: &str) -> &str {
    s.strip_prefix(BOM).unwrap_or(s)
}

/// Делит строку по первому неэкранированному `:`.
///
/// Остальные двоеточия принадлежат значению. Без двоеточия вся строка
/// считается именем, а значение пустым.
pub(crate) fn split_first_colon(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            ':' if !escaped => return (&line[..i], &line[i + 1..]),
            _ => escaped = false,
        }
    }
    (line, "")
}

/// Отрезает метку группы (`item1.` в `item1.TEL`).
pub(crate) fn strip_group(name: &str) -> &str {
    if let Some((group, rest)) = name.split_once('.') {
        if !group.is_empty()
            && group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return rest;
        }
    }
    name
}
