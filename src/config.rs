use clap::ValueEnum;

use crate::error::{HimenoError, Result};
use crate::grid::Dims;

pub const DEFAULT_OMEGA: f64 = 0.8; // 緩和係数
pub const DEFAULT_NN: usize = 200; // 反復回数
/// MMX Pentium 200MHz での MFLOPS
pub const REFERENCE_MFLOPS: f64 = 32.27;
/// 1セル1スイープあたりの浮動小数点演算数
pub const FLOPS_PER_CELL: f64 = 34.0;

/// 格子サイズのプリセット (mimax, mjmax, mkmax)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum GridSize {
    #[default]
    Small,
    Middle,
    Large,
    ExtLarge,
}

impl GridSize {
    pub fn extents(self) -> (usize, usize, usize) {
        match self {
            GridSize::Small => (129, 65, 65),
            GridSize::Middle => (257, 129, 129),
            GridSize::Large => (513, 257, 257),
            GridSize::ExtLarge => (1025, 513, 513),
        }
    }

    pub fn dims(self) -> Dims {
        let (mimax, mjmax, mkmax) = self.extents();
        Dims { mimax, mjmax, mkmax }
    }
}

/// スイープの並列化方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum KernelKind {
    /// 逐次実行（gosa の加算順は元の実装と同一）
    Single,
    /// rayon のローカルスレッドプールで i 平面ごとに並列化
    #[default]
    Rayon,
    /// 固定スレッド + Barrier、生ポインタによるダブルバッファ
    Barrier,
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub dims: Dims,
    pub omega: f64,
    pub nn: usize,
    pub threads: usize,
    pub kernel: KernelKind,
}

impl BenchConfig {
    pub fn new(size: GridSize, threads: usize) -> Self {
        BenchConfig {
            dims: size.dims(),
            omega: DEFAULT_OMEGA,
            nn: DEFAULT_NN,
            threads,
            kernel: KernelKind::default(),
        }
    }

    pub fn with_dims(mut self, dims: Dims) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_iterations(mut self, nn: usize) -> Self {
        self.nn = nn;
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        Dims::new(self.dims.mimax, self.dims.mjmax, self.dims.mkmax)?;
        if self.threads < 1 {
            return Err(HimenoError::config("thread count must be at least 1"));
        }
        if self.nn < 1 {
            return Err(HimenoError::config("iteration count must be at least 1"));
        }
        if !self.omega.is_finite() {
            return Err(HimenoError::config(format!(
                "relaxation factor must be finite, got {}",
                self.omega
            )));
        }
        Ok(())
    }
}

/// 位置引数のスレッド数を解釈する
pub fn parse_thread_count(arg: Option<&str>) -> Result<usize> {
    let raw = arg.ok_or_else(|| HimenoError::config("missing thread count argument"))?;
    let threads = raw.trim().parse::<usize>().map_err(|_| {
        HimenoError::config(format!("thread count must be a positive integer, got {raw:?}"))
    })?;
    if threads < 1 {
        return Err(HimenoError::config("thread count must be at least 1"));
    }
    Ok(threads)
}
