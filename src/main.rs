use std::io::{self, Write};

use clap::Parser;
use himeno_rust::config::{parse_thread_count, BenchConfig, GridSize, KernelKind, DEFAULT_NN, DEFAULT_OMEGA};
use himeno_rust::driver;
use himeno_rust::report::{write_header, write_results};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// 圧力ポアソン方程式の point-Jacobi ベンチマーク (Himeno)
#[derive(Parser, Debug)]
#[command(name = "himeno_rust")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Himeno pressure-Poisson point-Jacobi benchmark", long_about = None)]
struct Cli {
    /// スレッド数
    threads: Option<String>,

    /// 格子サイズのプリセット
    #[arg(short, long, value_enum, default_value_t = GridSize::Small)]
    size: GridSize,

    /// 並列化方式
    #[arg(short, long, value_enum, default_value_t = KernelKind::Rayon)]
    kernel: KernelKind,

    /// 反復回数
    #[arg(short = 'n', long, default_value_t = DEFAULT_NN)]
    iterations: usize,

    /// 緩和係数
    #[arg(long, default_value_t = DEFAULT_OMEGA)]
    omega: f64,

    /// ログレベル (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr へ（stdout はレポート専用）
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let threads = parse_thread_count(cli.threads.as_deref())?;
    let config = BenchConfig::new(cli.size, threads)
        .with_kernel(cli.kernel)
        .with_iterations(cli.iterations)
        .with_omega(cli.omega);
    config.validate()?;

    let mut grid = driver::prepare(config.dims)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_header(&mut out, &grid.dims)?;
    out.flush()?;

    let measurement = driver::measure(&mut grid, &config)?;
    write_results(&mut out, &measurement)?;
    out.flush()?;

    measurement.require_throughput()?;
    Ok(())
}
