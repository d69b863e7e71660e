//! The per-pixel bit-plane swap at the heart of the scheme.
//!
//! One bit per color channel: the secret pixel's most significant bit is
//! planted into the cover pixel's least significant bit. Revealing promotes
//! that bit back to the top position, so the recovered image is a 1-bit
//! quantization of the secret (each channel is either 0 or 128).
//!
//! ## Example of usage
//! ```rust
//! use image::Rgb;
//! use frameveil_core::bitplane::{embed_pixel, reveal_pixel};
//!
//! let stego = embed_pixel(Rgb([200, 53, 10]), Rgb([255, 0, 128]));
//! assert_eq!(stego, Rgb([201, 52, 11]));
//! assert_eq!(reveal_pixel(stego), Rgb([128, 0, 128]));
//! ```

use image::Rgb;

/// plants the secret channel's top bit into the cover channel's bottom bit
#[inline(always)]
pub fn embed_channel(cover: u8, secret: u8) -> u8 {
    (cover & 0xFE) | (secret >> 7)
}

/// promotes the carried bottom bit back to the top bit position
#[inline(always)]
pub fn reveal_channel(stego: u8) -> u8 {
    (stego & 0x01) << 7
}

/// embeds one secret pixel into one cover pixel, channel by channel
pub fn embed_pixel(cover: Rgb<u8>, secret: Rgb<u8>) -> Rgb<u8> {
    Rgb([
        embed_channel(cover.0[0], secret.0[0]),
        embed_channel(cover.0[1], secret.0[1]),
        embed_channel(cover.0[2], secret.0[2]),
    ])
}

/// recovers the carried pixel from a stego pixel; all but the carried bit is lost
pub fn reveal_pixel(stego: Rgb<u8>) -> Rgb<u8> {
    Rgb([
        reveal_channel(stego.0[0]),
        reveal_channel(stego.0[1]),
        reveal_channel(stego.0[2]),
    ])
}
