//! In-place pixel layout helpers shared by the producers.

use scenecap_surface_core::PixelFormat;

/// Swap the red and blue channels of every pixel, converting Bgra8 ⇄ Rgba8.
///
/// `data` length must be a multiple of 4.
pub fn swap_red_blue_in_place(data: &mut [u8]) {
    let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(data);
    for px in pixels {
        px.swap(0, 2);
    }
}

/// Convert `data` from `from` to `to` in place, if they differ.
pub fn convert_format_in_place(data: &mut [u8], from: PixelFormat, to: PixelFormat) {
    if from != to {
        swap_red_blue_in_place(data);
    }
}

/// Reverse the row order of an image stored at `bytes_per_row` stride,
/// turning bottom-up readback data into top-down frames.
pub fn flip_rows_in_place(data: &mut [u8], bytes_per_row: usize, height: usize) {
    if height < 2 {
        return;
    }
    let (mut top, mut bottom) = (0, height - 1);
    while top < bottom {
        let (head, tail) = data.split_at_mut(bottom * bytes_per_row);
        head[top * bytes_per_row..top * bytes_per_row + bytes_per_row]
            .swap_with_slice(&mut tail[..bytes_per_row]);
        top += 1;
        bottom -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_blue_swap_converts_both_directions() {
        let mut data = vec![1u8, 2, 3, 4, 10, 20, 30, 40];
        swap_red_blue_in_place(&mut data);
        assert_eq!(data, vec![3, 2, 1, 4, 30, 20, 10, 40]);
        swap_red_blue_in_place(&mut data);
        assert_eq!(data, vec![1, 2, 3, 4, 10, 20, 30, 40]);
    }

    #[test]
    fn convert_is_noop_for_matching_formats() {
        let mut data = vec![1u8, 2, 3, 4];
        convert_format_in_place(&mut data, PixelFormat::Bgra8, PixelFormat::Bgra8);
        assert_eq!(data, vec![1, 2, 3, 4]);
        convert_format_in_place(&mut data, PixelFormat::Bgra8, PixelFormat::Rgba8);
        assert_eq!(data, vec![3, 2, 1, 4]);
    }

    #[test]
    fn flip_reverses_row_order_with_stride() {
        // 3 rows, 4 bytes of pixels + row stride of 4 (no padding)
        let mut data = vec![
            1, 1, 1, 1, //
            2, 2, 2, 2, //
            3, 3, 3, 3,
        ];
        flip_rows_in_place(&mut data, 4, 3);
        assert_eq!(
            data,
            vec![
                3, 3, 3, 3, //
                2, 2, 2, 2, //
                1, 1, 1, 1,
            ]
        );
    }

    #[test]
    fn flip_even_row_count() {
        let mut data = vec![1, 2, 3, 4];
        flip_rows_in_place(&mut data, 2, 2);
        assert_eq!(data, vec![3, 4, 1, 2]);
    }

    #[test]
    fn flip_single_row_is_noop() {
        let mut data = vec![7, 8];
        flip_rows_in_place(&mut data, 2, 1);
        assert_eq!(data, vec![7, 8]);
    }
}
