use rayon::prelude::*;

use crate::grid::GridStore;
use crate::implementations::stencil::sweep_plane;

/*
  Rayon版

  - 書き込み先 (wrk2) を i 平面単位で par_chunks_mut に分割し、各平面を独立に計算
  - 読み取りはコミット済みの p と読み取り専用の係数のみなのでロック不要
  - 残差は平面ごとの部分和を平面順に並べてから逐次に足す
    → 分割はスレッド数に依存しないので、何スレッドでも同じ値になる
  - for_each の終了が計算フェーズとコミット (swap) の間のバリア

  呼び出し側の install したスレッドプール上で実行される
*/
pub fn jacobi(grid: &mut GridStore, omega: f64, nn: usize) -> f64 {
    grid.prime_scratch();

    let GridStore { dims, p, wrk2, coef } = grid;
    let dims = *dims;
    let coef = &*coef;
    let plane = dims.plane_len();
    let imax = dims.imax();

    let mut partials = vec![0.0; imax - 2];

    for _ in 0..nn {
        {
            let src = &p[..];
            let interior_dst = &mut wrk2[plane..(imax - 1) * plane];

            interior_dst
                .par_chunks_mut(plane)
                .zip(partials.par_iter_mut())
                .enumerate()
                .for_each(|(r, (out, partial))| {
                    // r は内部領域での平面番号、実際の i は r + 1
                    *partial = sweep_plane(&dims, coef, src, r + 1, out, omega, 0.0);
                });
        }

        std::mem::swap(p, wrk2);
    }

    partials.iter().sum()
}
