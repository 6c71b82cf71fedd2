//! `neon hub`: the landing view, one row per modality.

use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

pub async fn show_hub(state: &AppState, json: bool) -> Result<()> {
    let counts = state.catalog.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Feature").fg(Color::White),
        Cell::new("Modality").fg(Color::White),
        Cell::new("Conversations").fg(Color::White),
    ]);
    for count in &counts {
        table.add_row(vec![
            Cell::new(count.modality.label()).fg(Color::Cyan),
            Cell::new(count.modality.to_string()).fg(Color::DarkGrey),
            Cell::new(count.conversations).set_alignment(CellAlignment::Right),
        ]);
    }

    println!();
    println!("  {}", style("Neon").magenta().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  Open one with: {}",
        style("neon chat <modality>").yellow()
    );
    println!();
    Ok(())
}
