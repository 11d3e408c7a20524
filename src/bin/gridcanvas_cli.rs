//! CLI tool for gridcanvas - lays out a grid description and outputs the
//! display list of one frame as JSON
//!
//! Usage:
//!   gridcanvas_cli <grid.json>              # Output JSON to stdout
//!   gridcanvas_cli <grid.json> -o out.json  # Output JSON to file
//!
//! Set `RUST_LOG=gridcanvas=trace` to see frame statistics on stderr.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};

use gridcanvas::render::Decorations;
use gridcanvas::{
    CellAddress, CellContent, ColumnDescriptor, GridConfig, GridController, GridHost, GroupPoint,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Input document. `rows` is indexed `[record][column]`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridDescription {
    #[serde(default)]
    config: GridConfig,
    columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    rows: Vec<Vec<CellContent>>,
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default)]
    scroll_left: f32,
    #[serde(default)]
    scroll_top: f32,
    #[serde(default)]
    group_points: Vec<GroupPoint>,
    #[serde(default)]
    collapsed_groups: Option<BTreeSet<String>>,
    #[serde(default)]
    decorations: Decorations,
    #[serde(default)]
    active_cell: Option<CellAddress>,
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

/// Serves cells from the description; callbacks are ignored.
struct RowsHost {
    rows: Vec<Vec<CellContent>>,
}

impl GridHost for RowsHost {
    fn cell_content(&self, address: CellAddress) -> CellContent {
        self.rows
            .get(address.row as usize)
            .and_then(|row| row.get(address.col as usize))
            .cloned()
            .unwrap_or_else(|| CellContent::text(""))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: gridcanvas_cli <grid.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let data = match fs::read_to_string(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let description: GridDescription = match serde_json::from_str(&data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error parsing grid description: {}", e);
            std::process::exit(1);
        }
    };

    let mut host = RowsHost {
        rows: description.rows,
    };
    let record_count = u32::try_from(host.rows.len()).unwrap_or(u32::MAX);
    let mut controller = GridController::new(description.columns, record_count, description.config);
    controller.resize(description.width, description.height);
    if !description.group_points.is_empty() {
        controller.set_group_points(description.group_points, &mut host);
    }
    if let Some(collapsed) = description.collapsed_groups {
        controller.set_collapsed_groups(collapsed, &mut host);
    }
    controller.set_decorations(description.decorations);
    if let Some(active) = description.active_cell {
        if !controller.set_active_cell(active, &mut host) {
            eprintln!("Ignoring active cell {}:{}: not shown", active.col, active.row);
        }
    }
    controller.scroll_to(description.scroll_left, description.scroll_top, &mut host);

    let frame = controller.frame(&host);

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&frame) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
