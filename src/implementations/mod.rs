pub mod safe;
pub mod stencil;

#[path = "unsafe"]
pub mod unsafe_impl {
    pub mod barrier_unsafe;
}

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::KernelKind;
use crate::error::{HimenoError, Result};
use crate::grid::GridStore;

/// カーネルごとに事前に用意するもの
enum Backend {
    Single,
    /// 計測区間の外で作ったローカルプール
    Rayon(ThreadPool),
    /// ワーカースレッドは `jacobi` 呼び出しごとに生成する（1回の計測につき1回）
    Barrier { threads: usize },
}

/// スレッド数込みで準備済みのカーネル
///
/// rayon のプール生成は計測区間の外で済ませておく。
/// Barrier 版は `thread::scope` の都合でスレッド生成が計測区間に含まれる。
/// 生成はスイープごとではなく `jacobi` 1回につき1度だけ。
pub struct KernelRunner {
    kind: KernelKind,
    backend: Backend,
}

impl KernelRunner {
    pub fn new(kind: KernelKind, threads: usize) -> Result<Self> {
        if threads < 1 {
            return Err(HimenoError::config("thread count must be at least 1"));
        }

        let backend = match kind {
            KernelKind::Single => Backend::Single,
            KernelKind::Rayon => Backend::Rayon(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("himeno-{i}"))
                    .build()
                    .map_err(|e| HimenoError::config(format!("failed to build thread pool: {e}")))?,
            ),
            KernelKind::Barrier => Backend::Barrier { threads },
        };

        Ok(KernelRunner { kind, backend })
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn threads(&self) -> usize {
        match &self.backend {
            Backend::Single => 1,
            Backend::Rayon(pool) => pool.current_num_threads(),
            Backend::Barrier { threads } => *threads,
        }
    }

    /// nn 回スイープし、最後のスイープの残差 (gosa) を返す
    pub fn jacobi(&self, grid: &mut GridStore, omega: f64, nn: usize) -> f64 {
        match &self.backend {
            Backend::Single => safe::single::jacobi(grid, omega, nn),
            Backend::Rayon(pool) => pool.install(|| safe::rayon::jacobi(grid, omega, nn)),
            Backend::Barrier { threads } => {
                unsafe_impl::barrier_unsafe::barrier_unsafe(grid, omega, nn, *threads)
            }
        }
    }
}
