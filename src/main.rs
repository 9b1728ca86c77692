mod analysis;
mod config;
mod error;
mod fetcher;
mod generator;
mod nlp;
mod pipeline;
mod prompt;
mod render;
mod utils;

#[cfg(test)]
mod testutil;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use analysis::KeywordRules;
use config::Settings;
use pipeline::{Pipeline, Stage};
use prompt::templates;
use prompt::{PromptTemplate, PRESETS};

#[derive(Parser)]
#[command(
    name = "edital_analyzer",
    about = "Analyze public notices (editais) with rule-based NLP and a local LLM"
)]
struct Cli {
    /// Generation model (overrides EDITAL_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,
    /// Generation endpoint (overrides EDITAL_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Keyword rules JSON file (see `rules` for the format)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the edital named in the instruction, extract signals and ask the model
    Analyze {
        /// Instruction text containing the edital URL (read from stdin if omitted
        /// and no --template or --url is given)
        instruction: Option<String>,
        /// Start from a preset template
        #[arg(short, long, value_enum, conflicts_with = "instruction")]
        template: Option<TemplateKind>,
        /// URL appended to the instruction or template
        #[arg(short, long)]
        url: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Also print the prompt sent to the model
        #[arg(long)]
        show_prompt: bool,
    },
    /// Fetch a page and print only the extracted signals
    Extract {
        url: String,
        /// Print the signals as JSON
        #[arg(long)]
        json: bool,
    },
    /// List preset instruction templates
    Templates,
    /// Print the default keyword rules as JSON
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateKind {
    Basic,
    Eligibility,
    Financial,
}

impl TemplateKind {
    fn preset(self) -> PromptTemplate {
        match self {
            TemplateKind::Basic => templates::BASIC,
            TemplateKind::Eligibility => templates::ELIGIBILITY,
            TemplateKind::Financial => templates::FINANCIAL,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }

    let result = match cli.command {
        Commands::Templates => {
            for t in PRESETS {
                let first_line = t.text.lines().next().unwrap_or_default();
                println!("{:<12} | {:<26} | {}", t.key, t.label, utils::ellipsize(first_line, 60));
            }
            Ok(())
        }
        Commands::Rules => {
            println!("{}", serde_json::to_string_pretty(&KeywordRules::default())?);
            Ok(())
        }
        Commands::Extract { url, json } => {
            let rules = load_rules(cli.rules.as_deref())?;
            let pipeline = Pipeline::new(&settings, nlp::shared(), rules)?;
            let pb = spinner()?;
            let outcome = pipeline
                .extract(&url, &mut |stage: Stage| pb.set_message(stage.to_string()))
                .await;
            pb.finish_and_clear();

            let (page, analysis) = outcome.context("Erro ao extrair conteúdo")?;
            if json {
                let doc = render::signals_json(&page.url, &analysis);
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", render::signals_panel(&analysis));
            }
            Ok(())
        }
        Commands::Analyze {
            instruction,
            template,
            url,
            json,
            show_prompt,
        } => {
            let rules = load_rules(cli.rules.as_deref())?;
            let instruction = build_instruction(instruction, template, url)?;
            let pipeline = Pipeline::new(&settings, nlp::shared(), rules)?;
            info!(model = %settings.model, endpoint = %settings.endpoint, "Starting analysis");

            let pb = spinner()?;
            let outcome = pipeline
                .run(&instruction, |stage| pb.set_message(stage.to_string()))
                .await;
            pb.finish_and_clear();

            let report = outcome?;
            info!(stage = %report.final_stage(), url = %report.page.url, "Analysis finished");
            if json {
                println!("{}", serde_json::to_string_pretty(&render::report_json(&report))?);
            } else {
                println!("### Resultados da Análise\n");
                print!("{}", render::signals_panel(&report.analysis));
                println!();
                print!("{}", render::answer_panel(&report.answer));
            }
            if show_prompt {
                eprintln!("\n--- Prompt ---\n{}", report.prompt);
            }

            match report.answer {
                Ok(_) => Ok(()),
                Err(e) => Err(anyhow::Error::new(e).context("Erro no processamento do modelo")),
            }
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_rules(path: Option<&Path>) -> anyhow::Result<KeywordRules> {
    match path {
        Some(p) => KeywordRules::from_json_file(p)
            .with_context(|| format!("Failed to load keyword rules from {}", p.display())),
        None => Ok(KeywordRules::default()),
    }
}

/// Instruction from the argument, a preset or stdin, with the URL appended.
/// A URL given alone fills the basic preset.
fn build_instruction(
    instruction: Option<String>,
    template: Option<TemplateKind>,
    url: Option<String>,
) -> anyhow::Result<String> {
    if let (None, Some(u)) = (&instruction, &url) {
        let kind = template.unwrap_or(TemplateKind::Basic);
        return Ok(kind.preset().with_url(u));
    }

    let base = match (instruction, template) {
        (Some(text), _) => text,
        (None, Some(kind)) => kind.preset().text.to_string(),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read instruction from stdin")?;
            buf
        }
    };

    Ok(match url {
        Some(u) if base.is_empty() || base.ends_with(char::is_whitespace) => format!("{}{}", base, u),
        Some(u) => format!("{} {}", base, u),
        None => base,
    })
}

fn spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
