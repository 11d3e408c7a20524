//! Benchmarks for grid geometry and frame building on large grids.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridcanvas::hit_test::hit_test;
use gridcanvas::layout::{GridLayout, LinearRows, Viewport};
use gridcanvas::{
    CellAddress, CellContent, ColumnDescriptor, GridConfig, GridController, GridHost, GroupPoint,
};

const ROWS: u32 = 100_000;

struct NumberHost;

impl GridHost for NumberHost {
    fn cell_content(&self, address: CellAddress) -> CellContent {
        CellContent::number(f64::from(address.row) * 10.0 + f64::from(address.col))
    }
}

fn columns(count: u32) -> Vec<ColumnDescriptor> {
    (0..count)
        .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("Column {i}"), 120.0))
        .collect()
}

/// Groups of 50 records each.
fn group_points(records: u32) -> Vec<GroupPoint> {
    (0..records / 50)
        .flat_map(|g| {
            [
                GroupPoint::group(format!("g{g}"), 0, format!("Group {g}")),
                GroupPoint::rows(50),
            ]
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let config = GridConfig::default();
    let cols = columns(30);
    let mut group = c.benchmark_group("layout");

    group.bench_function("ungrouped_100k", |b| {
        b.iter(|| GridLayout::new(&cols, LinearRows::ungrouped(black_box(ROWS)), &config))
    });

    let points = group_points(ROWS);
    let collapsed = BTreeSet::new();
    group.bench_function("grouped_100k", |b| {
        b.iter(|| {
            GridLayout::new(
                &cols,
                LinearRows::grouped(black_box(&points), &collapsed),
                &config,
            )
        })
    });
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let config = GridConfig::default();
    let cols = columns(30);
    let layout = GridLayout::new(&cols, LinearRows::ungrouped(ROWS), &config);
    let mut viewport = Viewport::new(1280.0, 800.0);

    let mut group = c.benchmark_group("hit_test");
    for scroll_top in [0.0_f32, 1_000_000.0, 3_000_000.0] {
        viewport.set_scroll(500.0, scroll_top, &layout);
        group.bench_with_input(
            BenchmarkId::from_parameter(scroll_top as u32),
            &viewport,
            |b, viewport| {
                b.iter(|| hit_test(&layout, viewport, &cols, black_box(640.0), black_box(400.0)))
            },
        );
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut controller = GridController::new(columns(30), ROWS, GridConfig::default());
    controller.resize(1920.0, 1080.0);
    let mut host = NumberHost;

    c.bench_function("frame_top", |b| b.iter(|| controller.frame(black_box(&host))));

    controller.scroll_to(2_000.0, 1_500_000.0, &mut host);
    c.bench_function("frame_scrolled", |b| {
        b.iter(|| controller.frame(black_box(&host)))
    });

    let mut grouped = GridController::new(columns(30), ROWS, GridConfig::default());
    grouped.resize(1920.0, 1080.0);
    grouped.set_group_points(group_points(ROWS), &mut host);
    grouped.scroll_to(0.0, 800_000.0, &mut host);
    c.bench_function("frame_grouped", |b| b.iter(|| grouped.frame(black_box(&host))));
}

criterion_group!(benches, bench_layout, bench_hit_test, bench_frame);
criterion_main!(benches);
