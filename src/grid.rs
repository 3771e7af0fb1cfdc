use sysinfo::System;
use tracing::debug;

use crate::error::{HimenoError, Result};

/// フィールド数 (p, a×4, b×3, c×3, bnd, wrk1, wrk2)
const DOUBLES_PER_CELL: u128 = 14;

/// 境界層を含む格子の大きさ
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dims {
    pub mimax: usize,
    pub mjmax: usize,
    pub mkmax: usize,
}

impl Dims {
    pub fn new(mimax: usize, mjmax: usize, mkmax: usize) -> Result<Self> {
        if mimax < 3 || mjmax < 3 || mkmax < 3 {
            return Err(HimenoError::config(format!(
                "grid extents must be at least 3 on every axis, got {mimax}x{mjmax}x{mkmax}"
            )));
        }
        Ok(Dims { mimax, mjmax, mkmax })
    }

    pub fn imax(&self) -> usize {
        self.mimax - 1
    }

    pub fn jmax(&self) -> usize {
        self.mjmax - 1
    }

    pub fn kmax(&self) -> usize {
        self.mkmax - 1
    }

    pub fn cells(&self) -> usize {
        self.mimax * self.mjmax * self.mkmax
    }

    /// i 平面1枚の要素数（k が最速で変化する）
    pub fn plane_len(&self) -> usize {
        self.mjmax * self.mkmax
    }

    /// 1スイープで更新される内部セル数
    pub fn interior_cells(&self) -> usize {
        (self.imax() - 2) * (self.jmax() - 2) * (self.kmax() - 2)
    }

    #[inline(always)]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(
            i < self.mimax && j < self.mjmax && k < self.mkmax,
            "index ({i}, {j}, {k}) out of {}x{}x{}",
            self.mimax,
            self.mjmax,
            self.mkmax
        );
        (i * self.mjmax + j) * self.mkmax + k
    }

    pub fn required_bytes(&self) -> Option<u128> {
        (self.mimax as u128)
            .checked_mul(self.mjmax as u128)?
            .checked_mul(self.mkmax as u128)?
            .checked_mul(DOUBLES_PER_CELL * std::mem::size_of::<f64>() as u128)
    }
}

/// 初期化後は読み取り専用の係数・マスク・ソース項
#[derive(Clone, Debug)]
pub struct Coefficients {
    pub a: Vec<f64>,    // [cell][4]
    pub b: Vec<f64>,    // [cell][3]
    pub c: Vec<f64>,    // [cell][3]
    pub bnd: Vec<f64>,  // 0 = 固体, 1 = 流体
    pub wrk1: Vec<f64>, // ソース項
}

impl Coefficients {
    #[inline(always)]
    pub fn a(&self, dims: &Dims, i: usize, j: usize, k: usize, n: usize) -> f64 {
        debug_assert!(n < 4);
        self.a[dims.idx(i, j, k) * 4 + n]
    }

    #[inline(always)]
    pub fn b(&self, dims: &Dims, i: usize, j: usize, k: usize, n: usize) -> f64 {
        debug_assert!(n < 3);
        self.b[dims.idx(i, j, k) * 3 + n]
    }

    #[inline(always)]
    pub fn c(&self, dims: &Dims, i: usize, j: usize, k: usize, n: usize) -> f64 {
        debug_assert!(n < 3);
        self.c[dims.idx(i, j, k) * 3 + n]
    }

    #[inline(always)]
    pub fn bnd(&self, dims: &Dims, i: usize, j: usize, k: usize) -> f64 {
        self.bnd[dims.idx(i, j, k)]
    }

    #[inline(always)]
    pub fn wrk1(&self, dims: &Dims, i: usize, j: usize, k: usize) -> f64 {
        self.wrk1[dims.idx(i, j, k)]
    }
}

/// 全フィールドを所有する格子
///
/// 配列はすべて `[i][j][k]` の行優先で平坦化されており、
/// 最内ループ (k) が連続メモリを走査する。
#[derive(Clone, Debug)]
pub struct GridStore {
    pub dims: Dims,
    pub p: Vec<f64>,
    pub wrk2: Vec<f64>,
    pub coef: Coefficients,
}

impl GridStore {
    /// ゼロ埋めで確保する。
    ///
    /// 必要量が利用可能なメモリ（cgroup の上限を含む）を超える場合は、
    /// 何も確保せずに `Allocation` を返す。
    pub fn allocate(dims: Dims) -> Result<Self> {
        Self::allocate_within(dims, available_memory())
    }

    /// `budget` バイトを上限として確保する
    pub fn allocate_within(dims: Dims, budget: u64) -> Result<Self> {
        let bytes = dims.required_bytes().ok_or(HimenoError::Allocation {
            bytes: u128::MAX,
            available: budget,
        })?;
        if bytes > u128::from(budget) {
            return Err(HimenoError::Allocation { bytes, available: budget });
        }

        let cells = dims
            .mimax
            .checked_mul(dims.mjmax)
            .and_then(|v| v.checked_mul(dims.mkmax))
            .filter(|v| v.checked_mul(4).is_some())
            .ok_or(HimenoError::Allocation { bytes, available: budget })?;

        let zeroed = |len: usize| -> Result<Vec<f64>> {
            let mut v = Vec::new();
            v.try_reserve_exact(len)
                .map_err(|_| HimenoError::Allocation { bytes, available: budget })?;
            v.resize(len, 0.0);
            Ok(v)
        };

        Ok(GridStore {
            dims,
            p: zeroed(cells)?,
            wrk2: zeroed(cells)?,
            coef: Coefficients {
                a: zeroed(cells * 4)?,
                b: zeroed(cells * 3)?,
                c: zeroed(cells * 3)?,
                bnd: zeroed(cells)?,
                wrk1: zeroed(cells)?,
            },
        })
    }

    #[inline(always)]
    pub fn p(&self, i: usize, j: usize, k: usize) -> f64 {
        self.p[self.dims.idx(i, j, k)]
    }

    pub fn set_p(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.dims.idx(i, j, k);
        self.p[idx] = value;
    }

    pub fn set_a(&mut self, i: usize, j: usize, k: usize, n: usize, value: f64) {
        debug_assert!(n < 4);
        let idx = self.dims.idx(i, j, k);
        self.coef.a[idx * 4 + n] = value;
    }

    pub fn set_b(&mut self, i: usize, j: usize, k: usize, n: usize, value: f64) {
        debug_assert!(n < 3);
        let idx = self.dims.idx(i, j, k);
        self.coef.b[idx * 3 + n] = value;
    }

    pub fn set_c(&mut self, i: usize, j: usize, k: usize, n: usize, value: f64) {
        debug_assert!(n < 3);
        let idx = self.dims.idx(i, j, k);
        self.coef.c[idx * 3 + n] = value;
    }

    pub fn set_bnd(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.dims.idx(i, j, k);
        self.coef.bnd[idx] = value;
    }

    pub fn set_wrk1(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.dims.idx(i, j, k);
        self.coef.wrk1[idx] = value;
    }

    /// wrk2 を p で埋める。
    /// 境界層はどちらのバッファでも書き換えられないため、以降はスワップでコミットできる
    pub fn prime_scratch(&mut self) {
        self.wrk2.copy_from_slice(&self.p);
    }

    /// 内部セル以外（いずれかの軸で 0 または max-1 以上）か
    pub fn is_boundary(&self, i: usize, j: usize, k: usize) -> bool {
        let d = &self.dims;
        i == 0 || j == 0 || k == 0 || i >= d.imax() - 1 || j >= d.jmax() - 1 || k >= d.kmax() - 1
    }
}

/// 現在確保できるメモリ量（バイト）
///
/// cgroup の上限がある場合は小さい方。取得できない環境では上限なしとみなす。
pub fn available_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();

    let host = match sys.available_memory() {
        0 => u64::MAX,
        n => n,
    };
    let limit = sys.cgroup_limits().map_or(u64::MAX, |c| c.free_memory);
    let available = host.min(limit);
    debug!(host, cgroup = limit, available, "available memory");
    available
}
