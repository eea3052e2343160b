use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use ssb_agenda::model::{Language, StormSurgeBarrier};
use ssb_agenda::xlsx::ReadOptions;
use ssb_agenda::{OutputOptions, fonts};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    /// Knowledge calendar of one storm surge barrier
    Calendar,
    /// Impact pathway per impact category
    Pathway,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Lang {
    Nl,
    En,
}

#[derive(Parser)]
#[command(version, about = "Render a storm surge barrier research agenda workbook to a cross-referenced PDF")]
struct Cli {
    /// Input XLSX workbook
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = Kind::Calendar)]
    kind: Kind,

    /// Barrier code for the knowledge calendar (6SVK, MLK, HK, RP, HIJK, OSK, HV)
    #[arg(long, default_value = "6SVK")]
    barrier: String,

    #[arg(long, default_value = "Database")]
    sheet: String,

    /// One-based row number of the first record
    #[arg(long, default_value_t = 3)]
    first_row: usize,

    /// Output language (defaults to Dutch for calendars, English for pathways)
    #[arg(long, value_enum)]
    lang: Option<Lang>,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Output file name without extension (defaults to the input file stem)
    #[arg(long)]
    name: Option<String>,

    /// TrueType font used to measure and draw text
    #[arg(long, env = "SSB_AGENDA_FONT")]
    font: Option<PathBuf>,

    /// Also write per-page PDFs and the merged PDF without links
    #[arg(long)]
    keep_intermediate: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let name = cli.name.clone().unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "agenda".to_string())
    });
    let output = OutputOptions {
        output_dir: cli.output_dir.clone(),
        name,
        keep_intermediate: cli.keep_intermediate,
    };
    let read = ReadOptions {
        sheet: cli.sheet.clone(),
        first_row: cli.first_row,
        ..ReadOptions::default()
    };
    let measure = fonts::load_measure(cli.font.as_deref());

    let result = match cli.kind {
        Kind::Calendar => {
            let Some(barrier) = StormSurgeBarrier::from_code(&cli.barrier) else {
                eprintln!("Error: unknown storm surge barrier '{}'", cli.barrier);
                return ExitCode::FAILURE;
            };
            let language = match cli.lang {
                Some(Lang::En) => Language::English,
                _ => Language::Dutch,
            };
            ssb_agenda::build_knowledge_calendar(&cli.input, barrier, &read, language, measure.as_ref(), &output)
        }
        Kind::Pathway => {
            let language = match cli.lang {
                Some(Lang::Nl) => Language::Dutch,
                _ => Language::English,
            };
            ssb_agenda::build_impact_pathway(&cli.input, &read, language, measure.as_ref(), &output)
        }
    };

    match result {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
