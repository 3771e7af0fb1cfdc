use std::mem;
use std::sync::Barrier;
use std::thread;

use crate::grid::{Coefficients, Dims, GridStore};

/*
  固定スレッド数 + Barrier 版

  - i 平面の内部範囲 [1, imax-1) をスレッド数で連続チャンクに分割
  - 各スレッドは p / wrk2 の生ポインタを持ち、自分の平面だけを書き込む
  - 1スイープにつき Barrier は1回: 全員の書き込みが終わってから src/dst を入れ替える
  - 境界層は p / wrk2 のどちらにも書き込まれないので、入れ替えだけでコミットになる
  - 各スレッドは最後のスイープの平面ごとの残差を返し、平面順に足し合わせる
  - スレッドは呼び出しごとに scope 内で生成するので、その生成コストは計測に含まれる
    （rayon 版はプールを事前に作るため含まれない）
*/

// ラッパー構造体
#[derive(Clone, Copy)]
struct FieldPtr {
    data: *mut f64,
}

// SAFETY: 書き込み範囲はスレッドごとに互いに素で、読み書きの切り替えは Barrier で同期する
unsafe impl Send for FieldPtr {}
unsafe impl Sync for FieldPtr {}

impl FieldPtr {
    // メソッド経由で取り出すことで、クロージャが構造体ごとキャプチャする
    fn as_ptr(self) -> *mut f64 {
        self.data
    }
}

pub fn barrier_unsafe(grid: &mut GridStore, omega: f64, nn: usize, threads: usize) -> f64 {
    grid.prime_scratch();

    let dims = grid.dims;
    let planes = dims.imax() - 2;
    let workers = threads.clamp(1, planes.max(1));

    let ptr_p = FieldPtr { data: grid.p.as_mut_ptr() };
    let ptr_w = FieldPtr { data: grid.wrk2.as_mut_ptr() };
    let coef = &grid.coef;

    let barrier = Barrier::new(workers);

    let partials: Vec<f64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let (start, end) = plane_chunk(w, workers, planes);
                let barrier = &barrier;

                scope.spawn(move || {
                    let mut src = ptr_p.as_ptr();
                    let mut dst = ptr_w.as_ptr();
                    let mut last = vec![0.0; end - start];

                    for _ in 0..nn {
                        for (slot, i) in last.iter_mut().zip(start..end) {
                            // SAFETY: i は [1, imax-1) 内で、このスレッドだけが dst の平面 i を書く
                            *slot = unsafe { sweep_plane_raw(&dims, coef, src, dst, i, omega) };
                        }

                        barrier.wait();
                        mem::swap(&mut src, &mut dst);
                    }

                    last
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    // 奇数回なら最新値は wrk2 のバッファ側にある
    if nn % 2 == 1 {
        mem::swap(&mut grid.p, &mut grid.wrk2);
    }

    partials.iter().sum()
}

/// w 番目のスレッドが担当する i の範囲 [start, end)
fn plane_chunk(w: usize, workers: usize, planes: usize) -> (usize, usize) {
    let base = planes / workers;
    let extra = planes % workers;
    let start = w * base + w.min(extra);
    let len = base + usize::from(w < extra);
    (start + 1, start + 1 + len)
}

#[inline(always)]
unsafe fn sweep_plane_raw(
    dims: &Dims,
    coef: &Coefficients,
    src: *const f64,
    dst: *mut f64,
    i: usize,
    omega: f64,
) -> f64 {
    let si = dims.plane_len();
    let sj = dims.mkmax;
    let mut gosa = 0.0;

    for j in 1..dims.jmax() - 1 {
        let row = dims.idx(i, j, 0);
        for k in 1..dims.kmax() - 1 {
            let c0 = row + k;
            let a = &coef.a[c0 * 4..c0 * 4 + 4];
            let b = &coef.b[c0 * 3..c0 * 3 + 3];
            let c = &coef.c[c0 * 3..c0 * 3 + 3];

            // SAFETY: 内部セルなので ±si, ±sj, ±1 の近傍はすべて配列内
            unsafe {
                let q = src.add(c0);

                let s0 = a[0] * *q.add(si)
                    + a[1] * *q.add(sj)
                    + a[2] * *q.add(1)
                    + b[0] * (*q.add(si + sj) - *q.add(si - sj) - *q.sub(si - sj) + *q.sub(si + sj))
                    + b[1] * (*q.add(sj + 1) - *q.sub(sj - 1) - *q.add(sj - 1) + *q.sub(sj + 1))
                    + b[2] * (*q.add(si + 1) - *q.sub(si - 1) - *q.add(si - 1) + *q.sub(si + 1))
                    + c[0] * *q.sub(si)
                    + c[1] * *q.sub(sj)
                    + c[2] * *q.sub(1)
                    + coef.wrk1[c0];

                let ss = (s0 * a[3] - *q) * coef.bnd[c0];

                gosa += ss * ss;

                *dst.add(c0) = *q + omega * ss;
            }
        }
    }

    gosa
}
