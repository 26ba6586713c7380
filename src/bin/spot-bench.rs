//! spot-bench - 斑点分析性能基准工具
//!
//! 生成合成板数据，对比串行与rayon并行的"强度提取 + 重复样验证"吞吐量。
//! 支持表格与JSON输出。

use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use chrono::Local;
use clap::{Parser, ValueEnum};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use mcr_spot_tool::{PixelRegion, extract_intensity, validate_replicates};
use rayon::prelude::*;
use serde::Serialize;

// ============================================================================
// 常量定义
// ============================================================================

const DEFAULT_RUNS: usize = 10;
const DEFAULT_GROUPS: usize = 384;
const DEFAULT_REPLICATES: usize = 5;
const DEFAULT_SPOT_SIZE: usize = 24;

// ============================================================================
// CLI 定义
// ============================================================================

#[derive(Parser)]
#[command(name = "spot-bench")]
#[command(about = "斑点分析性能基准工具 / Spot analysis benchmark")]
#[command(version)]
struct Cli {
    /// 运行次数
    /// Number of runs
    #[arg(long, short = 'n', default_value_t = DEFAULT_RUNS)]
    runs: usize,

    /// 每块板的重复样组数
    /// Replicate groups per plate
    #[arg(long, short = 'g', default_value_t = DEFAULT_GROUPS)]
    groups: usize,

    /// 每组重复样数
    /// Replicates per group
    #[arg(long, short = 'r', default_value_t = DEFAULT_REPLICATES)]
    replicates: usize,

    /// 斑点边长（像素）
    /// Spot edge length in pixels
    #[arg(long, short = 's', default_value_t = DEFAULT_SPOT_SIZE)]
    spot_size: usize,

    /// 相对容差
    /// Validation cutoff
    #[arg(long, short = 'c', default_value_t = mcr_spot_tool::DEFAULT_CUTOFF)]
    cutoff: f64,

    /// 输出格式
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// ============================================================================
// 报告结构
// ============================================================================

#[derive(Serialize)]
struct BenchReport {
    date: String,
    groups: usize,
    replicates: usize,
    spot_pixels: usize,
    runs: usize,
    modes: Vec<ModeStats>,
}

#[derive(Serialize)]
struct ModeStats {
    mode: &'static str,
    min_ms: f64,
    mean_ms: f64,
    max_ms: f64,
    spots_per_sec: f64,
    valid_replicates: usize,
}

// ============================================================================
// 合成数据
// ============================================================================

/// 确定性伪随机序列（线性同余），保证每次基准的输入一致
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// 生成一块板：每组一个目标强度，个别重复样偏离以制造离群值
fn synthesize_plate(cli: &Cli) -> Result<Vec<Vec<PixelRegion>>> {
    let mut rng = Lcg(0x5eed);
    let pixels = cli.spot_size * cli.spot_size;

    (0..cli.groups)
        .map(|_| {
            let level = 500.0 + rng.next_unit() * 30_000.0;
            (0..cli.replicates)
                .map(|_| {
                    let outlier = rng.next_unit() < 0.1;
                    let scale = if outlier { 1.5 } else { 1.0 };
                    let samples = (0..pixels)
                        .map(|_| level * scale * (0.5 + rng.next_unit()))
                        .collect();
                    PixelRegion::new(cli.spot_size, cli.spot_size, samples)
                        .context("合成像素区域失败 / failed to build region")
                })
                .collect::<Result<Vec<PixelRegion>>>()
        })
        .collect()
}

fn analyze_group(regions: &[PixelRegion], cutoff: f64) -> Result<usize> {
    let intensities = regions
        .iter()
        .map(extract_intensity)
        .collect::<Result<Vec<f64>, _>>()?;
    let flags = validate_replicates(&intensities, cutoff)?;
    Ok(flags.iter().filter(|&&f| f).count())
}

// ============================================================================
// 基准执行
// ============================================================================

fn run_mode(
    mode: &'static str,
    plate: &[Vec<PixelRegion>],
    cli: &Cli,
    analyze: impl Fn(&[Vec<PixelRegion>]) -> Result<usize>,
) -> Result<ModeStats> {
    let mut durations = Vec::with_capacity(cli.runs);
    let mut valid_replicates = 0;

    for _ in 0..cli.runs {
        let start = Instant::now();
        valid_replicates = analyze(plate)?;
        durations.push(start.elapsed());
    }

    let ms = |d: &Duration| d.as_secs_f64() * 1000.0;
    let min_ms = durations.iter().map(ms).fold(f64::INFINITY, f64::min);
    let max_ms = durations.iter().map(ms).fold(0.0, f64::max);
    let mean_ms = durations.iter().map(ms).sum::<f64>() / durations.len() as f64;
    let spots = (cli.groups * cli.replicates) as f64;

    Ok(ModeStats {
        mode,
        min_ms,
        mean_ms,
        max_ms,
        spots_per_sec: if mean_ms > 0.0 { spots / (mean_ms / 1000.0) } else { 0.0 },
        valid_replicates,
    })
}

fn print_table(report: &BenchReport) {
    println!(
        "spot-bench {} | {} groups x {} replicates, {} px/spot, {} runs",
        report.date, report.groups, report.replicates, report.spot_pixels, report.runs
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Mode", "Min (ms)", "Mean (ms)", "Max (ms)", "Spots/s", "Valid"]);

    for m in &report.modes {
        table.add_row(vec![
            Cell::new(m.mode),
            Cell::new(format!("{:.2}", m.min_ms)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", m.mean_ms)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", m.max_ms)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", m.spots_per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(m.valid_replicates).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    ensure!(cli.runs > 0, "运行次数必须大于0 / --runs must be > 0");
    ensure!(
        cli.replicates >= 3,
        "每组至少3个重复样 / --replicates must be >= 3"
    );
    ensure!(
        cli.spot_size * cli.spot_size >= 10,
        "斑点至少10个像素 / spot must hold >= 10 pixels"
    );

    let plate = synthesize_plate(&cli)?;
    let cutoff = cli.cutoff;

    let serial = run_mode("serial", &plate, &cli, |plate| {
        plate
            .iter()
            .map(|group| analyze_group(group, cutoff))
            .sum()
    })?;

    let parallel = run_mode("rayon", &plate, &cli, |plate| {
        plate
            .par_iter()
            .map(|group| analyze_group(group, cutoff))
            .sum()
    })?;

    ensure!(
        serial.valid_replicates == parallel.valid_replicates,
        "串行与并行结果不一致 / serial and parallel results differ"
    );

    let report = BenchReport {
        date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        groups: cli.groups,
        replicates: cli.replicates,
        spot_pixels: cli.spot_size * cli.spot_size,
        runs: cli.runs,
        modes: vec![serial, parallel],
    };

    match cli.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
