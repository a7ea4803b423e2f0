use crate::config::{AppConfig, HEATMAP_THRESHOLDS, RAG_THRESHOLDS};
use crate::models::{HeatmapBand, Month, RagBand, TrendDirection};
use crate::portfolio::build_portfolio;
use crate::report::build_report;
use crate::scoring::{build_scorecard, classify_rag};
use crate::storage::{merge_scorecards, read_scorecards, read_submissions, write_scorecards};
use crate::trend::month_over_month;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scorecard")]
#[command(about = "Monthly business scorecards: scores, RAG bands, trends and heatmaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a CSV of monthly submissions and store the scorecards
    Score {
        input: PathBuf,
        /// Scorecard store (defaults to the configured path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the portfolio heatmap for one month
    Heatmap {
        #[arg(long)]
        month: Month,
        #[arg(long)]
        scorecards: Option<PathBuf>,
    },
    /// Write a markdown portfolio report for one month
    Report {
        #[arg(long)]
        month: Month,
        #[arg(long)]
        scorecards: Option<PathBuf>,
        #[arg(long, default_value = "scorecard-report.md")]
        out: PathBuf,
    },
    Rubric(RubricCmd),
}

#[derive(Parser, Debug)]
pub struct RubricCmd {
    #[command(subcommand)]
    pub cmd: RubricSub,
}

#[derive(Subcommand, Debug)]
pub enum RubricSub {
    Show,
}

pub fn run(cli: Cli, cfg: &AppConfig) -> Result<()> {
    colored::control::set_override(cfg.settings.ui.color);
    match cli.command {
        Commands::Score { input, out } => handle_score(input, out, cfg),
        Commands::Heatmap { month, scorecards } => handle_heatmap(month, scorecards, cfg),
        Commands::Report {
            month,
            scorecards,
            out,
        } => handle_report(month, scorecards, out, cfg),
        Commands::Rubric(rubric_cmd) => handle_rubric(rubric_cmd, cfg),
    }
}

fn store_path(custom: Option<PathBuf>, cfg: &AppConfig) -> PathBuf {
    custom.unwrap_or_else(|| cfg.settings.paths.scorecards_csv.clone())
}

fn handle_score(input: PathBuf, out: Option<PathBuf>, cfg: &AppConfig) -> Result<()> {
    let submissions = read_submissions(&input)?;
    tracing::info!("Read {} submissions from {}", submissions.len(), input.display());

    let mut fresh = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        let card = build_scorecard(submission, &cfg.rubric).with_context(|| {
            format!(
                "Failed to score {} for {}",
                submission.business_id, submission.month
            )
        })?;
        fresh.push(card);
    }

    let path = store_path(out, cfg);
    let mut stored = read_scorecards(&path)?;
    merge_scorecards(&mut stored, fresh.clone());
    write_scorecards(&path, &stored)?;

    for card in &fresh {
        let rag = classify_rag(card.total_score)?;
        let trend = month_over_month(&stored, &card.business_id, card.month)
            .map(|t| match t.direction {
                TrendDirection::Up => t.to_string().green().to_string(),
                TrendDirection::Down => t.to_string().red().to_string(),
                TrendDirection::Same => t.to_string(),
            })
            .unwrap_or_else(|| "n/a".dimmed().to_string());
        println!(
            "{} | {} | total:{:>3} | {} | trend:{}",
            card.business_name,
            card.month,
            card.total_score,
            paint_rag(rag),
            trend
        );
    }
    println!("Stored {} scorecards in {}.", fresh.len(), path.display());
    Ok(())
}

fn handle_heatmap(month: Month, scorecards: Option<PathBuf>, cfg: &AppConfig) -> Result<()> {
    let cards = read_scorecards(&store_path(scorecards, cfg))?;
    let rows = build_portfolio(&cards, month, &cfg.rubric)?;
    if rows.is_empty() {
        println!("No scorecards found for {month}.");
        return Ok(());
    }
    for row in rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| {
                paint_heat(
                    c.band,
                    &format!("{} {}/{}", c.section.label(), c.score, c.max_score),
                )
            })
            .collect();
        println!(
            "{:<24} {:>3} {} | {}",
            row.business_name,
            row.total_score,
            paint_rag(row.rag),
            cells.join(" | ")
        );
    }
    Ok(())
}

fn handle_report(
    month: Month,
    scorecards: Option<PathBuf>,
    out: PathBuf,
    cfg: &AppConfig,
) -> Result<()> {
    let cards = read_scorecards(&store_path(scorecards, cfg))?;
    let rows = build_portfolio(&cards, month, &cfg.rubric)?;
    let report = build_report(month, &rows);
    std::fs::write(&out, report).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Report written to {}.", out.display());
    Ok(())
}

fn handle_rubric(cmd: RubricCmd, cfg: &AppConfig) -> Result<()> {
    match cmd.cmd {
        RubricSub::Show => {
            println!("Config directory: {}", cfg.base_dir.display());
            println!(
                "Scorecard store: {}",
                cfg.settings.paths.scorecards_csv.display()
            );
            for (metric, band) in cfg.rubric.bands() {
                println!(
                    "{:<18} {:>2} pts | full at {:>6.1} | zero below {:>6.1}",
                    metric.label(),
                    band.max_points,
                    band.full_credit_at,
                    band.zero_credit_below
                );
            }
            println!(
                "RAG: green >= {}, amber >= {}, red below",
                RAG_THRESHOLDS.green_from, RAG_THRESHOLDS.amber_from
            );
            println!(
                "Heatmap: excellent >= {}%, good >= {}%, fair >= {}%, poor >= {}%",
                HEATMAP_THRESHOLDS.excellent_from,
                HEATMAP_THRESHOLDS.good_from,
                HEATMAP_THRESHOLDS.fair_from,
                HEATMAP_THRESHOLDS.poor_from
            );
        }
    }
    Ok(())
}

fn paint_rag(rag: RagBand) -> String {
    match rag {
        RagBand::Green => rag.label().green().to_string(),
        RagBand::Amber => rag.label().yellow().to_string(),
        RagBand::Red => rag.label().red().to_string(),
    }
}

fn paint_heat(band: HeatmapBand, text: &str) -> String {
    match band {
        HeatmapBand::Excellent => text.bright_green().to_string(),
        HeatmapBand::Good => text.green().to_string(),
        HeatmapBand::Fair => text.yellow().to_string(),
        HeatmapBand::Poor => text.bright_red().to_string(),
        HeatmapBand::Critical => text.red().bold().to_string(),
        HeatmapBand::Empty => text.dimmed().to_string(),
    }
}
