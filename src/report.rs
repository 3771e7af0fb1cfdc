use std::io::{self, Write};

use crate::driver::Measurement;
use crate::grid::Dims;

/// C の `%e` と同じ書式 (`1.234560e-05`)
pub fn format_c_exp(value: f64) -> String {
    // 非有限値は glibc の表記に合わせる
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let s = format!("{value:.6e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => s,
        },
        None => s,
    }
}

/// 計測前に出力する格子サイズの2行
pub fn write_header<W: Write>(w: &mut W, dims: &Dims) -> io::Result<()> {
    writeln!(w, "mimax = {} mjmax = {} mkmax = {}", dims.mimax, dims.mjmax, dims.mkmax)?;
    writeln!(w, "imax = {} jmax = {} kmax ={}", dims.imax(), dims.jmax(), dims.kmax())
}

pub fn write_results<W: Write>(w: &mut W, m: &Measurement) -> io::Result<()> {
    writeln!(w, "cpu : {:.6} sec.", m.elapsed.as_secs_f64())?;
    writeln!(w, "Loop executed for {} times", m.nn)?;
    writeln!(w, "Gosa : {} ", format_c_exp(m.gosa))?;
    match (m.mflops, m.score()) {
        (Some(mflops), Some(score)) => {
            writeln!(w, "MFLOPS measured : {mflops:.6}")?;
            writeln!(w, "Score based on MMX Pentium 200MHz : {score:.6}")
        }
        _ => {
            writeln!(w, "MFLOPS measured : unavailable")?;
            writeln!(w, "Score based on MMX Pentium 200MHz : unavailable")
        }
    }
}
