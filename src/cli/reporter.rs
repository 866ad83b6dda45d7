// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::{BoundsReport, PointsReport, StatsReport, VolumeReport};
use crate::geometry::Classification;
use crate::io::BuiltScene;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    fn header(title: &str, cell: &str) {
        println!();
        Self::rule();
        println!("{} {}", format!("{title}:").bold(), cell.cyan());
        Self::rule();
    }

    pub fn report_volume(report: &VolumeReport) {
        Self::header("Volume", &report.cell);
        println!(
            "  {} {}",
            "Volume:".bright_black(),
            format!("{:.6}", report.volume).cyan()
        );
        println!(
            "  {} {} {}",
            "Unresolved:".bright_black(),
            format!("{:.6}", report.unresolved).yellow(),
            format!("(± {:.6})", 0.5 * report.unresolved).bright_black()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(report.duration).yellow()
        );
    }

    pub fn report_bounds(report: &BoundsReport) {
        Self::header("Bounds", &report.cell);
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            println!(
                "  {} [{}, {}]",
                format!("{name}:").bright_black(),
                format!("{:.6}", report.lower[axis]).cyan(),
                format!("{:.6}", report.upper[axis]).cyan()
            );
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(report.duration).yellow()
        );
    }

    pub fn report_stats(report: &StatsReport) {
        Self::header("Statistics", &report.cell);
        println!(
            "  {} {}",
            "Result:".bright_black(),
            Self::classification(report.result)
        );
        if !report.simplest.is_empty() {
            println!("  {}", "Simplest:".bright_black());
            for geometry in &report.simplest {
                println!("    {}", geometry.cyan());
            }
        }
        let Some(table) = &report.table else {
            println!("  {}", "Cell is not a composite shape".yellow());
            return;
        };
        for (row, volume) in table.rows().zip(&table.volumes) {
            let cells: Vec<String> = row.iter().map(|value| format!("{value:>2}")).collect();
            println!(
                "  [{}] {}",
                cells.join(" "),
                format!("{volume:.6}").bright_black()
            );
        }
        if report.coverages.is_empty() {
            return;
        }
        println!("\n{}", "Coverages:".bold());
        for cover in &report.coverages {
            let columns: Vec<String> = cover.iter().map(usize::to_string).collect();
            println!("  {{{}}}", columns.join(", ").green());
        }
    }

    pub fn report_points(report: &PointsReport) {
        Self::header("Points", &report.cell);
        let inside = report
            .results
            .iter()
            .filter(|value| **value == Classification::Inside)
            .count();
        println!(
            "  {} {} / {}",
            "Inside:".bright_black(),
            inside.to_string().green(),
            report.results.len()
        );
        if let Some(volume) = report.sampled_volume {
            println!(
                "  {} {}",
                "Sampled volume:".bright_black(),
                format!("{volume:.6}").cyan()
            );
        } else {
            for (point, value) in report.points.iter().zip(&report.results) {
                println!(
                    "  ({:.4}, {:.4}, {:.4}) {}",
                    point[0],
                    point[1],
                    point[2],
                    Self::classification(*value)
                );
            }
        }
    }

    /// List the cells of a parsed scene
    pub fn report_scene(scene: &BuiltScene) {
        println!();
        Self::rule();
        println!(
            "{} {} surfaces, {} cells",
            "Scene:".bold(),
            scene.surfaces.len().to_string().cyan(),
            scene.cells.len().to_string().cyan()
        );
        Self::rule();
        for cell in &scene.cells {
            println!(
                "  {} {}",
                format!("{}:", cell.label()).bright_black(),
                cell.expr
            );
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    fn classification(value: Classification) -> ColoredString {
        match value {
            Classification::Inside => value.to_string().green(),
            Classification::Outside => value.to_string().red(),
            Classification::Ambiguous => value.to_string().yellow(),
        }
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
