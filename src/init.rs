use rayon::prelude::*;

use crate::grid::GridStore;

/*
  初期値の設定 (initmt)

  - 全セルを 0 で確保済みなので、i < imax, j < jmax, k < kmax の範囲だけを埋める
  - 各軸の最大インデックス (mimax-1 など) の層は 0 のまま残る
  - i 平面ごとに独立なので rayon で並列に埋める
*/
pub fn initmt(grid: &mut GridStore) {
    let dims = grid.dims;
    let (imax, jmax, kmax) = (dims.imax(), dims.jmax(), dims.kmax());
    let plane = dims.plane_len();
    let mkmax = dims.mkmax;
    let denom = ((kmax - 1) * (kmax - 1)) as f64;

    let coef = &mut grid.coef;
    (
        grid.p.par_chunks_mut(plane),
        coef.a.par_chunks_mut(plane * 4),
        coef.b.par_chunks_mut(plane * 3),
        coef.c.par_chunks_mut(plane * 3),
        coef.bnd.par_chunks_mut(plane),
        coef.wrk1.par_chunks_mut(plane),
    )
        .into_par_iter()
        .take(imax)
        .for_each(|(p, a, b, c, bnd, wrk1)| {
            for j in 0..jmax {
                for k in 0..kmax {
                    let idx = j * mkmax + k;
                    a[idx * 4..idx * 4 + 4].copy_from_slice(&[1.0, 1.0, 1.0, 1.0 / 6.0]);
                    b[idx * 3..idx * 3 + 3].fill(0.0);
                    c[idx * 3..idx * 3 + 3].fill(1.0);
                    p[idx] = (k * k) as f64 / denom;
                    wrk1[idx] = 0.0;
                    bnd[idx] = 1.0;
                }
            }
        });
}
