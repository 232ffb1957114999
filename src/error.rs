use thiserror::Error;

/// Ошибка чтения карточек.
///
/// Разбор отдельных строк ошибкой не завершается: нераспознанные строки
/// пропускаются. Ошибкой считается сбой источника строк либо неизвестное
/// имя колонки.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("unknown field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("output error: {0}")]
    OutputError(#[from] std::io::Error),

    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
}
