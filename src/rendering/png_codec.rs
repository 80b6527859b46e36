//! PNG reading and writing for [`Image`] and [`IndexedImage`].
//!
//! Decoding accepts any PNG color type and bit depth and normalizes it to
//! 8-bit RGB or RGBA. Indexed output uses the smallest bit depth that fits the
//! palette and is recompressed with oxipng.

use std::io::Cursor;
use std::path::Path;

use retro_palette::{Image, IndexedImage, PixelFormat};

use crate::error::CodecError;

/// Decode PNG bytes into an 8-bit RGB or RGBA image.
///
/// Grayscale is expanded to RGB, palette images to RGB or RGBA (when a tRNS
/// chunk is present) and 16-bit channels are stripped to 8 bits.
pub fn decode_png(bytes: &[u8]) -> Result<Image, CodecError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(CodecError::Unsupported(format!(
            "bit depth {:?} after normalization",
            info.bit_depth
        )));
    }

    let image = match info.color_type {
        png::ColorType::Rgb => Image::from_rgb8(info.width, info.height, buf)?,
        png::ColorType::Rgba => Image::from_rgba8(info.width, info.height, buf)?,
        png::ColorType::Grayscale => {
            let rgb = buf.iter().flat_map(|&v| [v, v, v]).collect();
            Image::from_rgb8(info.width, info.height, rgb)?
        }
        png::ColorType::GrayscaleAlpha => {
            let rgba = buf
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect();
            Image::from_rgba8(info.width, info.height, rgba)?
        }
        png::ColorType::Indexed => {
            return Err(CodecError::Unsupported(
                "indexed color was not expanded".to_string(),
            ))
        }
    };
    Ok(image)
}

/// Read and decode a PNG file.
pub fn read_image(path: &Path) -> Result<Image, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_png(&bytes)
}

/// Encode an RGB or RGBA image as a truecolor PNG.
pub fn encode_png(image: &Image) -> Result<Vec<u8>, CodecError> {
    let color_type = match image.format() {
        PixelFormat::Rgb => png::ColorType::Rgb,
        PixelFormat::Rgba => png::ColorType::Rgba,
    };
    let png_bytes = write_png(
        image.width(),
        image.height(),
        color_type,
        png::BitDepth::Eight,
        None,
        image.as_raw(),
    )?;
    Ok(optimize(png_bytes))
}

/// Encode palette indices as an indexed PNG with a PLTE chunk.
///
/// Palettes of up to 2, 4 and 16 colors are written with 1, 2 and 4 bits per
/// pixel respectively; larger palettes use 8 bits.
pub fn encode_indexed_png(image: &IndexedImage) -> Result<Vec<u8>, CodecError> {
    let palette = image.palette();
    let (depth, bits) = indexed_depth(palette.len());
    let plte: Vec<u8> = palette.colors().iter().flat_map(|c| c.to_bytes()).collect();
    let packed = if bits == 8 {
        image.indices().to_vec()
    } else {
        pack_nbits(image.indices(), image.width(), bits)
    };

    // Fast settings, oxipng recompresses afterwards
    let png_bytes = write_png(
        image.width(),
        image.height(),
        png::ColorType::Indexed,
        depth,
        Some(&plte),
        &packed,
    )?;
    Ok(optimize(png_bytes))
}

/// Smallest PNG bit depth that can address `colors` palette entries.
fn indexed_depth(colors: usize) -> (png::BitDepth, u8) {
    match colors {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    }
}

/// Re-compress with oxipng, keeping the original bytes if that fails.
fn optimize(png_bytes: Vec<u8>) -> Vec<u8> {
    oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes)
}

fn write_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    data: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
    }
    Ok(buf.into_inner())
}

/// Pack pixel values into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = (width as usize).div_ceil(pixels_per_byte);
    let height = indices.len() / width as usize;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width as usize) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}
