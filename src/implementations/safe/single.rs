use std::mem;

use crate::grid::GridStore;
use crate::implementations::stencil::sweep_plane;

/// 逐次版。gosa は全セルを1本の累積で加算する（元の実装と同じ演算順）
pub fn jacobi(grid: &mut GridStore, omega: f64, nn: usize) -> f64 {
    let dims = grid.dims;
    let plane = dims.plane_len();
    let mut gosa = 0.0;

    grid.prime_scratch();

    for _ in 0..nn {
        // 残差は最後のスイープの値だけを返す
        gosa = 0.0;

        for i in 1..dims.imax() - 1 {
            let out = &mut grid.wrk2[i * plane..(i + 1) * plane];
            gosa = sweep_plane(&dims, &grid.coef, &grid.p, i, out, omega, gosa);
        }

        // コミット: wrk2 → p
        mem::swap(&mut grid.p, &mut grid.wrk2);
    }

    gosa
}
