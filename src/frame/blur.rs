//! Separable Gaussian blur over interleaved 8-bit planes.

use super::sample::reflect_101;
use super::saturate;

/// Normalized 1D Gaussian kernel of odd size `ksize`.
/// Sigma is derived from the size the way OpenCV does for sigma = 0:
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize / 2) as f32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Blur `data` (`width * height * channels` bytes) in place.
///
/// Borders mirror without repeating the edge pixel, so a flat image stays
/// flat. A kernel of size 1 or an empty image is a no-op.
pub fn gaussian_blur(data: &mut [u8], width: u32, height: u32, channels: usize, ksize: usize) {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 || channels == 0 || data.len() != w * h * channels {
        return;
    }
    let kernel = gaussian_kernel(ksize);
    if kernel.len() == 1 {
        return;
    }
    let half = (kernel.len() / 2) as i32;

    // --- Horizontal pass: data → temp (f32 keeps precision between passes) ---
    let mut temp = vec![0f32; data.len()];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, &weight) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as i32 + k as i32 - half, w as i32) as usize;
                    acc += data[(row + sx) * channels + c] as f32 * weight;
                }
                temp[(row + x) * channels + c] = acc;
            }
        }
    }

    // --- Vertical pass: temp → data ---
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, &weight) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as i32 + k as i32 - half, h as i32) as usize;
                    acc += temp[(sy * w + x) * channels + c] * weight;
                }
                data[(y * w + x) * channels + c] = saturate(acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        for size in [3, 5, 7, 51] {
            let k = gaussian_kernel(size);
            assert_eq!(k.len(), size);
            let sum: f32 = k.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!((k[0] - k[size - 1]).abs() < 1e-6);
            assert!(k[size / 2] >= k[0]);
        }
    }

    #[test]
    fn test_even_size_rounds_up() {
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn test_flat_image_stays_flat() {
        let mut data = vec![77u8; 9 * 7 * 3];
        gaussian_blur(&mut data, 9, 7, 3, 5);
        assert!(data.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut data = vec![0u8; 11 * 11];
        data[5 * 11 + 5] = 255;
        gaussian_blur(&mut data, 11, 11, 1, 5);
        assert!(data[5 * 11 + 5] < 255);
        assert!(data[5 * 11 + 6] > 0);
        assert_eq!(data[0], 0);
    }
}
