//! Inspect a background table workbook: print sheet names and the first rows of a sheet.
//! Usage: cargo run --bin inspect_background_table -- path/to/table.xlsx ["Spell Distribution"]

use std::path::Path;

use calamine::Reader;

use spellclass::data::table::{cell_str, is_marked, DEFAULT_SHEET_NAME};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: inspect_background_table <path-to.xlsx> [sheet]")?;
    let wanted = args.next().unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let mut wb = calamine::open_workbook_auto(path)?;
    let names = wb.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));

    let sheet_name = names
        .iter()
        .find(|s| s.trim() == wanted.trim())
        .or(names.first())
        .ok_or("No sheets")?
        .clone();
    if sheet_name.trim() != wanted.trim() {
        println!("\nSheet '{}' not found, falling back to first sheet", wanted);
    }
    println!("\nUsing sheet: {}", sheet_name);

    let range = wb.worksheet_range(&sheet_name)?;
    let (height, width) = range.get_size();
    println!("Size: {} rows x {} cols", height, width);

    let mut rows = range.rows();
    if let Some(header) = rows.next() {
        let headers: Vec<String> = header.iter().map(cell_str).collect();
        println!("Header: {}", headers.join(" | "));
        println!("\nFirst 25 backgrounds (marked columns):");
        for (i, row) in rows.take(25).enumerate() {
            let background = row.first().map(cell_str).unwrap_or_default();
            let marked: Vec<&str> = row
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, cell)| is_marked(&cell_str(cell)))
                .filter_map(|(j, _)| headers.get(j).map(|h| h.trim()))
                .collect();
            println!("  {}: {} -> {}", i + 1, background.trim(), marked.join(", "));
        }
    }
    Ok(())
}
