use crate::grid::{Coefficients, Dims};

/// i 平面1枚ぶんのヤコビ更新
///
/// `p` は前スイープでコミット済みの圧力場全体、`out` は wrk2 の i 平面
/// (`plane_len` 要素)。内部セル `j ∈ [1, jmax-1)`, `k ∈ [1, kmax-1)` だけを書き込む。
/// 残差は `gosa` に k 最内の順で加算して返すので、呼び出し側が平面をまたいで
/// 値を引き回せば逐次版と同じ加算順になる。
#[inline]
pub fn sweep_plane(
    dims: &Dims,
    coef: &Coefficients,
    p: &[f64],
    i: usize,
    out: &mut [f64],
    omega: f64,
    mut gosa: f64,
) -> f64 {
    debug_assert!(i >= 1 && i < dims.imax() - 1);
    debug_assert_eq!(out.len(), dims.plane_len());

    let si = dims.plane_len(); // i 方向のストライド
    let sj = dims.mkmax; // j 方向のストライド

    for j in 1..dims.jmax() - 1 {
        let row = dims.idx(i, j, 0);
        for k in 1..dims.kmax() - 1 {
            let c0 = row + k;
            let a = &coef.a[c0 * 4..c0 * 4 + 4];
            let b = &coef.b[c0 * 3..c0 * 3 + 3];
            let c = &coef.c[c0 * 3..c0 * 3 + 3];

            let s0 = a[0] * p[c0 + si]
                + a[1] * p[c0 + sj]
                + a[2] * p[c0 + 1]
                + b[0] * (p[c0 + si + sj] - p[c0 + si - sj] - p[c0 - si + sj] + p[c0 - si - sj])
                + b[1] * (p[c0 + sj + 1] - p[c0 - sj + 1] - p[c0 + sj - 1] + p[c0 - sj - 1])
                + b[2] * (p[c0 + si + 1] - p[c0 - si + 1] - p[c0 + si - 1] + p[c0 - si - 1])
                + c[0] * p[c0 - si]
                + c[1] * p[c0 - sj]
                + c[2] * p[c0 - 1]
                + coef.wrk1[c0];

            let ss = (s0 * a[3] - p[c0]) * coef.bnd[c0];

            gosa += ss * ss;

            out[j * sj + k] = p[c0] + omega * ss;
        }
    }

    gosa
}
