//! Terminal styling for the interactive flow

use console::{style, Emoji};
use std::path::Path;

use crate::domain::{format_number, ConversionMode, CoverSource, OutputFormat};
use crate::volume::Volume;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");

pub fn print_banner(version: &str) {
    println!();
    println!("    {} {}", style("manga-volumes").cyan().bold(), style(format!("v{version}")).dim());
    println!("    {}", style("Komikku chapters → e-reader volumes").dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {step_num}")).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {INFO}{message}");
}

pub fn print_warning(message: &str) {
    println!("    {WARN}{}", style(message).yellow());
}

/// Summary of what is about to be written.
pub struct PlanSummary<'a> {
    pub manga: &'a str,
    pub destination: &'a Path,
    pub format: OutputFormat,
    pub cover: CoverSource,
    pub mode: ConversionMode,
    pub volumes: &'a [Volume],
}

pub fn print_plan(plan: &PlanSummary<'_>) {
    println!();
    println!("    {}{}", BOOKS, style(plan.manga).cyan().bold());
    println!("      {}Destination: {}", FOLDER, plan.destination.display());
    println!(
        "      {}Format: {}  Cover: {}  Mode: {}",
        SAVE,
        style(plan.format).yellow(),
        style(plan.cover).yellow(),
        style(match plan.mode {
            ConversionMode::PerVolume => "one book per volume",
            ConversionMode::Omnibus => "single omnibus",
        })
        .yellow()
    );
    for volume in plan.volumes {
        let range = match (volume.chapters.first(), volume.chapters.last()) {
            (Some(first), Some(last)) if first.num == last.num => {
                format!("chapter {}", format_number(first.num))
            }
            (Some(first), Some(last)) => {
                format!("chapters {}–{}", format_number(first.num), format_number(last.num))
            }
            _ => style("no downloaded chapters").dim().to_string(),
        };
        println!(
            "      {:<10} {} {}",
            volume.dir_name(),
            range,
            style(format!("({} chapter(s))", volume.chapters.len())).dim()
        );
    }
    println!();
}

pub fn print_completion(output_dir: &Path) {
    println!();
    println!(
        "    {}{} {}",
        ROCKET,
        style("Done! Processed volumes saved in").green().bold(),
        style(format!("\"{}\"", output_dir.display())).green()
    );
    println!();
}
