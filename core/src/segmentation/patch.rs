use crate::error::{CoreError, CoreResult};
use png::{BitDepth, ColorType, Decoder, Limits, Transformations};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Large enough for a 16-bit RGBA patch of the expected size.
const DECODE_LIMIT_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Bool,
    Uint8,
    Uint16,
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PixelType::Bool => "bool",
            PixelType::Uint8 => "uint8",
            PixelType::Uint16 => "uint16",
        };
        f.write_str(s)
    }
}

/// What a decoded patch looks like as a pixel array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchInspection {
    pub dtype: PixelType,
    /// `[height, width]`, or `[height, width, channels]` for multi-channel images.
    pub shape: Vec<usize>,
    pub values: BTreeSet<u16>,
}

pub fn inspect_patch(path: &Path) -> CoreResult<PatchInspection> {
    let file = File::open(path)?;
    inspect_png(BufReader::new(file))
}

/// Decodes a PNG stream and reports dtype, shape and the distinct sample values.
///
/// Grey and palette images are single-channel (palette entries stay indices),
/// 1-bit grey is boolean, 2- and 4-bit grey is scaled up to 8 bits and only
/// 16-bit grey keeps its 16-bit samples. Colour images keep a channel axis.
pub fn inspect_png<R: Read>(r: R) -> CoreResult<PatchInspection> {
    let mut limits = Limits::default();
    limits.bytes = DECODE_LIMIT_BYTES;
    let mut decoder = Decoder::new_with_limits(r, limits);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;
    let needed = frame_bytes(reader.info()).filter(|n| *n <= DECODE_LIMIT_BYTES);
    if needed.is_none() {
        let info = reader.info();
        return Err(CoreError::InvalidInput(format!(
            "png of {}x{} exceeds the {} byte decode limit",
            info.width, info.height, DECODE_LIMIT_BYTES
        )));
    }
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;

    let bits: usize = match frame.bit_depth {
        BitDepth::One => 1,
        BitDepth::Two => 2,
        BitDepth::Four => 4,
        BitDepth::Eight => 8,
        BitDepth::Sixteen => 16,
    };
    let height = frame.height as usize;
    let width = frame.width as usize;
    let channels = frame.color_type.samples();

    let (dtype, shape) = match (frame.color_type, bits) {
        (ColorType::Grayscale, 1) => (PixelType::Bool, vec![height, width]),
        (ColorType::Grayscale, 16) => (PixelType::Uint16, vec![height, width]),
        (ColorType::Grayscale, _) | (ColorType::Indexed, _) => {
            (PixelType::Uint8, vec![height, width])
        }
        // 16-bit grey+alpha widens to RGBA.
        (ColorType::GrayscaleAlpha, 16) => (PixelType::Uint8, vec![height, width, 4]),
        _ => (PixelType::Uint8, vec![height, width, channels]),
    };

    let normalize = |raw: u16| -> u16 {
        match (frame.color_type, bits) {
            (ColorType::Grayscale, 2) | (ColorType::Grayscale, 4) => {
                raw * 255 / ((1u16 << bits) - 1)
            }
            (ColorType::Grayscale, 16) => raw,
            (_, 16) => raw >> 8,
            _ => raw,
        }
    };

    let mut seen = vec![false; 1 << 16];
    let samples_per_row = width * channels;
    for row in buf.chunks(frame.line_size).take(height) {
        if bits == 8 {
            for b in &row[..samples_per_row] {
                seen[*b as usize] = true;
            }
            continue;
        }
        for i in 0..samples_per_row {
            seen[normalize(read_sample(row, i, bits)) as usize] = true;
        }
    }
    let values: BTreeSet<u16> = seen
        .iter()
        .enumerate()
        .filter(|(_, s)| **s)
        .map(|(v, _)| v as u16)
        .collect();

    log::debug!(
        "decoded png {:?}/{} bit as {} {:?} with {} distinct values",
        frame.color_type,
        bits,
        dtype,
        shape,
        values.len()
    );

    Ok(PatchInspection {
        dtype,
        shape,
        values,
    })
}

/// Size of the undecoded frame, `None` on overflow.
fn frame_bytes(info: &png::Info) -> Option<usize> {
    let bits = info.bit_depth as usize;
    let row_bits = (info.width as usize)
        .checked_mul(info.color_type.samples())?
        .checked_mul(bits)?;
    row_bits.div_ceil(8).checked_mul(info.height as usize)
}

fn read_sample(row: &[u8], i: usize, bits: usize) -> u16 {
    match bits {
        16 => u16::from_be_bytes([row[2 * i], row[2 * i + 1]]),
        8 => row[i] as u16,
        _ => {
            let bit = i * bits;
            let shift = 8 - bits - bit % 8;
            ((row[bit / 8] >> shift) & ((1u8 << bits) - 1)) as u16
        }
    }
}
