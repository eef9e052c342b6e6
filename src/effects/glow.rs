//! Colored bloom keyed to a mask

use crate::frame::{saturate, Frame, Mask, CHANNELS};

/// Blur `mask` with a `kernel_size` Gaussian, stretch it to the full 0..255
/// range, tint it with `color` and add it onto `image` scaled by `intensity`.
/// Without a mask the image is returned unchanged.
pub fn glow_effect(
    image: &Frame,
    mask: Option<&Mask>,
    kernel_size: usize,
    intensity: f32,
    color: (u8, u8, u8),
) -> Frame {
    let Some(mask) = mask else {
        return image.clone();
    };
    if mask.width() != image.width() || mask.height() != image.height() {
        return image.clone();
    }

    let mut halo = mask.clone();
    halo.gaussian_blur(kernel_size);
    halo.normalize_min_max();

    let tint = [
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
    ];
    let mut out = image.clone();
    for (px, &v) in out
        .as_bytes_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(halo.as_slice().iter())
    {
        if v == 0 {
            continue;
        }
        for c in 0..CHANNELS {
            let layer = (v as f32 * tint[c]) as u8;
            px[c] = saturate(px[c] as f32 + layer as f32 * intensity);
        }
    }
    out
}
