use std::time::{Duration, Instant};

use tracing::{debug, info, info_span};

use crate::config::{BenchConfig, FLOPS_PER_CELL, REFERENCE_MFLOPS};
use crate::error::{HimenoError, Result};
use crate::grid::{Dims, GridStore};
use crate::implementations::KernelRunner;
use crate::init::initmt;

/// 1回の計測結果
#[derive(Clone, Debug)]
pub struct Measurement {
    pub dims: Dims,
    pub nn: usize,
    pub threads: usize,
    pub elapsed: Duration,
    pub gosa: f64,
    /// 経過時間が 0 のときは None
    pub mflops: Option<f64>,
}

impl Measurement {
    pub fn score(&self) -> Option<f64> {
        self.mflops.map(score)
    }

    /// MFLOPS が出せない計測をエラーにする
    pub fn require_throughput(&self) -> Result<f64> {
        self.mflops.ok_or(HimenoError::MeasurementDegenerate { elapsed: self.elapsed })
    }
}

/// 1スイープあたりの浮動小数点演算数
pub fn flop_count(dims: &Dims) -> f64 {
    ((dims.kmax() - 2) * (dims.jmax() - 2) * (dims.imax() - 2)) as f64 * FLOPS_PER_CELL
}

pub fn mflops(dims: &Dims, nn: usize, elapsed: Duration) -> Result<f64> {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return Err(HimenoError::MeasurementDegenerate { elapsed });
    }
    Ok(flop_count(dims) / secs * 1.0e-6 * nn as f64)
}

/// MMX Pentium 200MHz 比
pub fn score(mflops: f64) -> f64 {
    mflops / REFERENCE_MFLOPS
}

/// 格子を確保して初期値を設定する
pub fn prepare(dims: Dims) -> Result<GridStore> {
    debug!(mimax = dims.mimax, mjmax = dims.mjmax, mkmax = dims.mkmax, "allocating grid");
    let mut grid = GridStore::allocate(dims)?;
    initmt(&mut grid);
    debug!("grid initialized");
    Ok(grid)
}

/// 初期化済みの格子に対してヤコビ反復を計測する
pub fn measure(grid: &mut GridStore, config: &BenchConfig) -> Result<Measurement> {
    config.validate()?;
    if grid.dims != config.dims {
        return Err(HimenoError::config(format!(
            "grid dims {:?} do not match configured {:?}",
            grid.dims, config.dims
        )));
    }

    let runner = KernelRunner::new(config.kernel, config.threads)?;
    let _span = info_span!("jacobi", kernel = ?runner.kind(), threads = runner.threads()).entered();
    info!(nn = config.nn, omega = config.omega, "start iterations");

    let start = Instant::now();
    let gosa = runner.jacobi(grid, config.omega, config.nn);
    let elapsed = start.elapsed();

    let throughput = mflops(&grid.dims, config.nn, elapsed).ok();
    info!(?elapsed, gosa, mflops = ?throughput, "iterations finished");

    Ok(Measurement {
        dims: grid.dims,
        nn: config.nn,
        threads: runner.threads(),
        elapsed,
        gosa,
        mflops: throughput,
    })
}

/// 確保・初期化・計測をまとめて行う
pub fn run(config: &BenchConfig) -> Result<Measurement> {
    config.validate()?;
    let mut grid = prepare(config.dims)?;
    measure(&mut grid, config)
}
