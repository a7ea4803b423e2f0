use std::fmt::Write;

use crate::models::{Month, RagBand, TrendDirection};
use crate::portfolio::PortfolioRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RagSummary {
    pub green: usize,
    pub amber: usize,
    pub red: usize,
}

pub fn summarize_rag(rows: &[PortfolioRow]) -> RagSummary {
    rows.iter().fold(RagSummary::default(), |mut acc, row| {
        match row.rag {
            RagBand::Green => acc.green += 1,
            RagBand::Amber => acc.amber += 1,
            RagBand::Red => acc.red += 1,
        }
        acc
    })
}

pub fn build_report(month: Month, rows: &[PortfolioRow]) -> String {
    let summary = summarize_rag(rows);
    let mut output = String::new();

    let _ = writeln!(output, "# Portfolio Scorecard Report");
    let _ = writeln!(output, "Month: {month} ({} businesses)", rows.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## RAG Summary");
    let _ = writeln!(
        output,
        "- green: {}\n- amber: {}\n- red: {}",
        summary.green, summary.amber, summary.red
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Scores");
    if rows.is_empty() {
        let _ = writeln!(output, "No scorecards recorded for this month.");
        return output;
    }

    let headers: Vec<&str> = rows[0].cells.iter().map(|c| c.section.label()).collect();
    let _ = writeln!(
        output,
        "| Business | Total | RAG | Trend | {} |",
        headers.join(" | ")
    );
    let _ = writeln!(output, "|{}", "---|".repeat(4 + headers.len()));
    for row in rows {
        let trend = row
            .trend
            .map(|t| t.to_string())
            .unwrap_or_else(|| "n/a".into());
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| format!("{}/{} ({})", c.score, c.max_score, c.band))
            .collect();
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            row.business_name,
            row.total_score,
            row.rag,
            trend,
            cells.join(" | ")
        );
    }

    let mut movers: Vec<&PortfolioRow> = rows
        .iter()
        .filter(|r| {
            r.trend
                .is_some_and(|t| t.direction == TrendDirection::Down)
        })
        .collect();
    movers.sort_by_key(|r| std::cmp::Reverse(r.trend.map(|t| t.change).unwrap_or(0)));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Declining Businesses");
    if movers.is_empty() {
        let _ = writeln!(output, "No business declined versus the prior month.");
    } else {
        for row in movers {
            if let Some(trend) = row.trend {
                let _ = writeln!(
                    output,
                    "- {} down {} points to {} ({})",
                    row.business_name, trend.change, row.total_score, row.rag
                );
            }
        }
    }

    output
}
