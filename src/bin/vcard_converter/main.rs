use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use thiserror::Error;
use tracing::{debug, info};
use vcard_parser::{error, types};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Путь до файла с контактными карточками (.vcf)
    #[arg(long, required = true)]
    input_file: PathBuf,

    /// Формат вывода: text/csv
    #[arg(long, value_enum, default_value_t = KnownFileFormat::Text)]
    output_format: KnownFileFormat,

    /// Файл для вывода; если не задан, вывод идёт в stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Колонки через запятую, например FullName,CellPhone; по умолчанию все
    #[arg(long, value_delimiter = ',', value_parser = parse_field)]
    columns: Vec<types::Field>,

    /// Подробность журнала: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Выводить в журнал только ошибки
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KnownFileFormat {
    Text,
    Csv,
}

impl KnownFileFormat {
    fn as_supported(&self) -> types::SupportedFileFormat {
        match self {
            KnownFileFormat::Text => types::SupportedFileFormat::Text,
            KnownFileFormat::Csv => types::SupportedFileFormat::Csv,
        }
    }
}

fn parse_field(s: &str) -> Result<types::Field, String> {
    s.trim().parse().map_err(|err: error::ParseError| err.to_string())
}

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Parse(#[from] error::ParseError),
    #[error("{0}")]
    Dump(#[from] error::DumpError),
    #[error("{0}")]
    Usage(String),
    #[error("ошибка ввода-вывода: {0}")]
    IO(#[from] io::Error),
}

impl Error {
    fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => 1,
            Self::Dump(_) => 2,
            Self::Usage(_) => 3,
            Self::IO(_) => 4,
        }
    }
}

fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vcard_parser={log_level},vcard_converter={log_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, Error> {
    match path {
        Some(path) => {
            let file = fs::File::create(path).map_err(|err| {
                Error::Usage(format!(
                    "невозможно создать файл {}\n:{}",
                    path.display(),
                    err
                ))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run() -> Result<(), Error> {
    let args = Args::parse();
    setup_logging(&args);

    let input_file = fs::File::open(&args.input_file).map_err(|err| {
        Error::Usage(format!(
            "невозможно открыть файл {}\n:{}",
            args.input_file.display(),
            err
        ))
    })?;

    let columns = if args.columns.is_empty() {
        types::Field::ALL.to_vec()
    } else {
        args.columns.clone()
    };

    let mut output = open_output(args.output_file.as_ref())?;

    let mut read_error = None;
    let mut converted = 0usize;
    let records = vcard_parser::parse(input_file)
        .map_while(|record| match record {
            Ok(record) => Some(record),
            Err(err) => {
                read_error = Some(err);
                None
            }
        })
        .inspect(|_| converted += 1);

    vcard_parser::dump(
        &mut output,
        args.output_format.as_supported(),
        records,
        &columns,
    )?;
    output.flush()?;

    if let Some(err) = read_error {
        return Err(err.into());
    }

    info!(
        cards = converted,
        input = %args.input_file.display(),
        "conversion finished"
    );
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.code());
        }
    }
}
