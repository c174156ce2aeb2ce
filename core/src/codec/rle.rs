//! Run-length coding of a single board layer
//!
//! A run of two or more equal bytes is written as `ESCAPE, count - 1,
//! value` (at most 256 per escape); a single byte is written as itself.
//! The layer ends with `TERMINATOR`. Neither marker is a tile value.

use super::CodecError;
use crate::game::CELL_COUNT;

pub const ESCAPE: u8 = 0x7F;
pub const TERMINATOR: u8 = 0x7E;

const MAX_RUN: usize = 256;

pub fn encode_layer(layer: &[u8], out: &mut Vec<u8>) {
    let mut rest = layer;
    while let Some(&value) = rest.first() {
        let run = rest
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();
        if run == 1 {
            out.push(value);
        } else {
            out.extend_from_slice(&[ESCAPE, (run - 1) as u8, value]);
        }
        rest = &rest[run..];
    }
    out.push(TERMINATOR);
}

/// Expand one layer from the front of `input`, returning it and the number
/// of input bytes consumed.
pub fn decode_layer(input: &[u8]) -> Result<(Vec<u8>, usize), CodecError> {
    let mut layer = Vec::with_capacity(CELL_COUNT);
    let mut at = 0;
    loop {
        let byte = *input.get(at).ok_or(CodecError::Truncated)?;
        at += 1;
        match byte {
            TERMINATOR => break,
            ESCAPE => {
                let (count, value) = match input.get(at..at + 2) {
                    Some(&[count, value]) => (usize::from(count) + 1, value),
                    _ => return Err(CodecError::Truncated),
                };
                at += 2;
                if layer.len() + count > CELL_COUNT {
                    return Err(CodecError::LayerOverflow);
                }
                layer.resize(layer.len() + count, value);
            }
            value => {
                if layer.len() == CELL_COUNT {
                    return Err(CodecError::LayerOverflow);
                }
                layer.push(value);
            }
        }
    }
    if layer.len() < CELL_COUNT {
        return Err(CodecError::LayerUnderflow(layer.len()));
    }
    Ok((layer, at))
}
