use clap::Parser;
use himeno_rust::config::{BenchConfig, GridSize, KernelKind};
use himeno_rust::driver;
use himeno_rust::report::format_c_exp;

/// 全カーネルを同じ条件で実行し、残差と代表点の圧力を並べて表示する
#[derive(Parser, Debug)]
#[command(name = "compare_kernels")]
struct Args {
    /// スレッド数
    #[arg(default_value_t = 2)]
    threads: usize,

    #[arg(short, long, value_enum, default_value_t = GridSize::Small)]
    size: GridSize,

    /// 反復回数
    #[arg(short = 'n', long, default_value_t = 20)]
    iterations: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("=== カーネル別の結果比較 ===");
    println!("格子: {:?}, 反復: {}, スレッド数: {}", args.size, args.iterations, args.threads);
    println!();

    let kernels = [KernelKind::Single, KernelKind::Rayon, KernelKind::Barrier];

    for kernel in kernels {
        let config = BenchConfig::new(args.size, args.threads)
            .with_kernel(kernel)
            .with_iterations(args.iterations);

        let mut grid = driver::prepare(config.dims)?;
        let m = driver::measure(&mut grid, &config)?;

        let d = grid.dims;
        let (ci, cj, ck) = (d.imax() / 2, d.jmax() / 2, d.kmax() / 2);

        println!("{:?}:", kernel);
        println!("  Gosa = {}  ({:?})", format_c_exp(m.gosa), m.elapsed);
        println!("  中心点 [{}][{}][{}] = {:.12}", ci, cj, ck, grid.p(ci, cj, ck));
        println!("  内部の隅 [1][1][1] = {:.12}", grid.p(1, 1, 1));
        println!(
            "  内部の隅 [{}][{}][{}] = {:.12}",
            d.imax() - 2,
            d.jmax() - 2,
            d.kmax() - 2,
            grid.p(d.imax() - 2, d.jmax() - 2, d.kmax() - 2)
        );
        println!();
    }

    Ok(())
}
