use std::fmt;

use log::warn;

use crate::TgaError;

/// Size in bytes of the packed on-disk header
pub const HEADER_LEN: usize = 18;

/// Uncompressed true-colour image
pub const DATA_TYPE_TRUE_COLOUR: u8 = 2;

/// Bit of `image_descriptor` set when rows are stored top to bottom
pub const ORIGIN_TOP_LEFT: u8 = 0x20;

/// Header which tells us the pixel format and where the pixels are
///
/// | Offset | Size | Content                                     |
/// |--------|------|---------------------------------------------|
/// | 0x00   | 1    | Length of the image id following the header |
/// | 0x01   | 1    | Colour map type (unused)                    |
/// | 0x02   | 1    | Data type, must be `2`                      |
/// | 0x03   | 2    | Colour map origin (unused)                  |
/// | 0x05   | 2    | Colour map length (unused)                  |
/// | 0x07   | 1    | Colour map depth (unused)                   |
/// | 0x08   | 2    | X origin (unused)                           |
/// | 0x0A   | 2    | Y origin (unused)                           |
/// | 0x0C   | 2    | Width in pixels                             |
/// | 0x0E   | 2    | Height in pixels                            |
/// | 0x10   | 1    | Bits per pixel, 24 or 32                    |
/// | 0x11   | 1    | Image descriptor                            |
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub colour_map_type: u8,
    pub data_type: u8,
    pub colour_map_origin: u16,
    pub colour_map_length: u16,
    pub colour_map_depth: u8,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub image_descriptor: u8,
}

impl fmt::Debug for TgaHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TgaHeader")
            .field("data_type", &self.data_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bits_per_pixel", &self.bits_per_pixel)
            .field("top_left", &self.is_top_left())
            .finish()
    }
}

fn read_2_bytes(data: &[u8], offset: usize) -> u16 {
    (data[offset + 1] as u16) << 8 | (data[offset] as u16)
}

impl TgaHeader {
    /// Read the header from the start of `data`. Only the length is checked
    /// here, use [`TgaHeader::validate`] for the format constraints.
    pub fn parse(data: &[u8]) -> Result<Self, TgaError> {
        if data.len() < HEADER_LEN {
            return Err(TgaError::Truncated {
                needed: HEADER_LEN,
                got: data.len(),
            });
        }

        Ok(Self {
            id_length: data[0],
            colour_map_type: data[1],
            data_type: data[2],
            colour_map_origin: read_2_bytes(data, 3),
            colour_map_length: read_2_bytes(data, 5),
            colour_map_depth: data[7],
            x_origin: read_2_bytes(data, 8),
            y_origin: read_2_bytes(data, 10),
            width: read_2_bytes(data, 12),
            height: read_2_bytes(data, 14),
            bits_per_pixel: data[16],
            image_descriptor: data[17],
        })
    }

    /// Serialise back to the packed 18 byte layout
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut b = [0u8; HEADER_LEN];
        b[0] = self.id_length;
        b[1] = self.colour_map_type;
        b[2] = self.data_type;
        b[3..5].copy_from_slice(&self.colour_map_origin.to_le_bytes());
        b[5..7].copy_from_slice(&self.colour_map_length.to_le_bytes());
        b[7] = self.colour_map_depth;
        b[8..10].copy_from_slice(&self.x_origin.to_le_bytes());
        b[10..12].copy_from_slice(&self.y_origin.to_le_bytes());
        b[12..14].copy_from_slice(&self.width.to_le_bytes());
        b[14..16].copy_from_slice(&self.height.to_le_bytes());
        b[16] = self.bits_per_pixel;
        b[17] = self.image_descriptor;
        b
    }

    /// Colour channels per stored pixel
    #[inline]
    pub const fn channels(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    #[inline]
    pub const fn is_top_left(&self) -> bool {
        self.image_descriptor & ORIGIN_TOP_LEFT != 0
    }

    /// Offset of the first pixel byte, past the header and the image id
    #[inline]
    pub const fn pixel_offset(&self) -> usize {
        HEADER_LEN + self.id_length as usize
    }

    /// Bytes of pixel payload the header promises
    #[inline]
    pub const fn payload_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels()
    }

    pub fn validate(&self) -> Result<(), TgaError> {
        if self.data_type != DATA_TYPE_TRUE_COLOUR {
            warn!(
                "Only 24/32bit uncompressed TGAs are supported, got data type {}",
                self.data_type
            );
            return Err(TgaError::UnsupportedFormat(format!(
                "data type {} is not uncompressed true-colour",
                self.data_type
            )));
        }

        if self.channels() < 3 {
            warn!(
                "Only 24 and 32bit textures are supported, got {}bpp",
                self.bits_per_pixel
            );
            return Err(TgaError::UnsupportedFormat(format!(
                "{} bits per pixel, need at least 24",
                self.bits_per_pixel
            )));
        }
        Ok(())
    }
}
