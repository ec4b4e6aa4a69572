//! Separable Gaussian blur over premultiplied RGBA8, with Q16 fixed-point weights so the output
//! is reproducible across platforms.

use crate::foundation::error::{ThumbError, ThumbResult};

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Blur `src` (premultiplied RGBA8, `width * height * 4` bytes) with standard deviation `sigma`.
/// A non-positive sigma returns the input unchanged. Edges clamp.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f32) -> ThumbResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ThumbError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(ThumbError::render(
            "blur input must be width * height * 4 bytes",
        ));
    }
    let radius = radius_for_sigma(sigma);
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = q16_kernel(radius, sigma);
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    let (w, h) = (width as usize, height as usize);

    // Rows, then columns.
    for y in 0..h {
        convolve_line(src, &mut tmp, y * w * 4, 4, w, &kernel);
    }
    for x in 0..w {
        convolve_line(&tmp, &mut out, x * 4, w * 4, h, &kernel);
    }
    Ok(out)
}

fn q16_kernel(radius: u32, sigma: f32) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights: Vec<f64> = (-r..=r)
        .map(|i| (-(f64::from(i) * f64::from(i)) / denom).exp())
        .collect();
    let sum: f64 = weights.iter().sum();

    let mut q: Vec<u32> = weights
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Push rounding drift into the center tap so the weights sum to exactly 1.0.
    let total: i64 = q.iter().map(|&v| i64::from(v)).sum();
    let mid = q.len() / 2;
    q[mid] = (i64::from(q[mid]) + 65536 - total).clamp(0, 65536) as u32;
    q
}

/// Convolve `len` pixels starting at byte `start`, `stride` bytes apart.
fn convolve_line(src: &[u8], dst: &mut [u8], start: usize, stride: usize, len: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let last = len as isize - 1;
    for i in 0..len as isize {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let si = (i + ki as isize - radius).clamp(0, last) as usize;
            let idx = start + si * stride;
            for (c, a) in acc.iter_mut().enumerate() {
                *a += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        let out = start + i as usize * stride;
        for (c, a) in acc.iter().enumerate() {
            dst[out + c] = ((a + 32768) >> 16).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blur.rs"]
mod tests;
