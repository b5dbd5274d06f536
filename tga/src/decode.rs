use log::{debug, warn};

use crate::{RGBA_CHANNELS, TgaError, TgaHeader};

/// A decoded image, always RGBA8 with the first row at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Total length is width * height * RGBA_CHANNELS
    pub pixels: Vec<u8>,
}

impl Image {
    #[inline]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decode an uncompressed 24 or 32 bit TGA held fully in memory.
///
/// Stored pixels are BGR(A) and bottom-up unless the header's top-left bit is
/// set. The output swaps to RGBA, synthesising an opaque alpha for 24 bit
/// data, and flips rows so the origin is top-left.
pub fn decode(data: &[u8]) -> Result<Image, TgaError> {
    let header = TgaHeader::parse(data)?;
    debug!("Decoding texture {:?}", header);
    header.validate()?;

    let start = header.pixel_offset();
    let needed = start + header.payload_len();
    if data.len() < needed {
        warn!("Texture data ends early: need {needed} bytes, have {}", data.len());
        return Err(TgaError::Truncated {
            needed,
            got: data.len(),
        });
    }
    let src = &data[start..needed];

    let width = header.width as usize;
    let height = header.height as usize;
    let channels = header.channels();
    let src_stride = width * channels;
    let dst_stride = width * RGBA_CHANNELS;

    let mut pixels = vec![0u8; dst_stride * height];
    if pixels.is_empty() {
        return Ok(Image {
            width: header.width as u32,
            height: header.height as u32,
            pixels,
        });
    }

    for (y, dst_row) in pixels.chunks_exact_mut(dst_stride).enumerate() {
        let src_y = if header.is_top_left() { y } else { height - y - 1 };
        let src_row = &src[src_y * src_stride..(src_y + 1) * src_stride];

        for (dst, px) in dst_row
            .chunks_exact_mut(RGBA_CHANNELS)
            .zip(src_row.chunks_exact(channels))
        {
            dst[0] = px[2];
            dst[1] = px[1];
            dst[2] = px[0];
            dst[3] = if channels >= 4 { px[3] } else { 255 };
        }
    }

    Ok(Image {
        width: header.width as u32,
        height: header.height as u32,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HEADER_LEN, ORIGIN_TOP_LEFT};

    fn build(data_type: u8, bpp: u8, descriptor: u8, w: u16, h: u16, payload: &[u8]) -> Vec<u8> {
        let header = TgaHeader {
            id_length: 0,
            colour_map_type: 0,
            data_type,
            colour_map_origin: 0,
            colour_map_length: 0,
            colour_map_depth: 0,
            x_origin: 0,
            y_origin: 0,
            width: w,
            height: h,
            bits_per_pixel: bpp,
            image_descriptor: descriptor,
        };
        let mut v = header.to_bytes().to_vec();
        v.extend_from_slice(payload);
        v
    }

    // Two rows of BGRA, row 0 first in storage
    const PAYLOAD_2X2: [u8; 16] = [
        1, 2, 3, 4, 5, 6, 7, 8, // row 0
        9, 10, 11, 12, 13, 14, 15, 16, // row 1
    ];

    const ROW_0_RGBA: [u8; 8] = [3, 2, 1, 4, 7, 6, 5, 8];
    const ROW_1_RGBA: [u8; 8] = [11, 10, 9, 12, 15, 14, 13, 16];

    #[test]
    fn top_left_keeps_row_order() {
        let data = build(2, 32, ORIGIN_TOP_LEFT, 2, 2, &PAYLOAD_2X2);
        let image = decode(&data).unwrap();

        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(&image.pixels[..8], &ROW_0_RGBA);
        assert_eq!(&image.pixels[8..], &ROW_1_RGBA);
    }

    #[test]
    fn bottom_left_reverses_rows() {
        let data = build(2, 32, 0, 2, 2, &PAYLOAD_2X2);
        let image = decode(&data).unwrap();

        assert_eq!(&image.pixels[..8], &ROW_1_RGBA);
        assert_eq!(&image.pixels[8..], &ROW_0_RGBA);
    }

    #[test]
    fn rgb_gets_opaque_alpha() {
        // 3x1 so the source stride is not a multiple of four
        let payload = [10, 20, 30, 40, 50, 60, 70, 80, 90];
        let data = build(2, 24, ORIGIN_TOP_LEFT, 3, 1, &payload);
        let image = decode(&data).unwrap();

        assert_eq!(
            image.pixels,
            vec![30, 20, 10, 255, 60, 50, 40, 255, 90, 80, 70, 255]
        );
    }

    #[test]
    fn rgb_bottom_up_two_rows() {
        let payload = [1, 2, 3, 4, 5, 6];
        let data = build(2, 24, 0, 1, 2, &payload);
        let image = decode(&data).unwrap();

        assert_eq!(image.pixels, vec![6, 5, 4, 255, 3, 2, 1, 255]);
    }

    #[test]
    fn rejects_other_data_types() {
        for data_type in [0u8, 1, 3, 9, 10, 11, 255] {
            let data = build(data_type, 32, ORIGIN_TOP_LEFT, 2, 2, &PAYLOAD_2X2);
            assert!(matches!(
                decode(&data),
                Err(TgaError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn rejects_shallow_pixels() {
        for bpp in [0u8, 1, 8, 15, 16, 23] {
            let data = build(2, bpp, ORIGIN_TOP_LEFT, 2, 2, &PAYLOAD_2X2);
            assert!(matches!(
                decode(&data),
                Err(TgaError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn rejects_short_payload() {
        let data = build(2, 32, ORIGIN_TOP_LEFT, 2, 2, &PAYLOAD_2X2[..12]);
        assert_eq!(
            decode(&data),
            Err(TgaError::Truncated {
                needed: HEADER_LEN + 16,
                got: HEADER_LEN + 12
            })
        );
    }

    #[test]
    fn skips_image_id() {
        let mut data = build(2, 32, ORIGIN_TOP_LEFT, 2, 2, &[]);
        data[0] = 3;
        data.extend_from_slice(b"abc");
        data.extend_from_slice(&PAYLOAD_2X2);

        let image = decode(&data).unwrap();
        assert_eq!(&image.pixels[..8], &ROW_0_RGBA);
    }

    #[test]
    fn zero_sized_image() {
        let data = build(2, 32, 0, 0, 4, &[]);
        let image = decode(&data).unwrap();
        assert_eq!(image.dimensions(), (0, 4));
        assert!(image.pixels.is_empty());
    }
}
