//! State codec
//!
//! Serializes a [`GameState`] to bytes and back, bit-exactly. All
//! multi-byte fields are big-endian.
//!
//! ```text
//! offset  size    field
//! 0       1       version: FLAT or RLE
//! 1       2       protagonist word
//! 3       *       foreground layer (1024 bytes, or RLE stream)
//! *       *       background layer (1024 bytes, or RLE stream)
//! *       2       tick
//! *       2       chips left (signed)
//! *       8       keys: blue, red, green, yellow
//! *       4       boots: water, fire, ice, suction (nonzero = held)
//! *       4       rng cursor
//! *       2       click target cell, NO_CLICK when none
//! *       2 + n   trap bitset length, bytes
//! *       2 + 2n  roster length, entity words
//! *       2 + 2n  slip-roster length, entity words
//! ```
//!
//! Slip-roster entries are written as entity words rather than indices and
//! re-linked to roster entries on decode. The two forms differ only in how
//! the layers are stored, so [`compress`] and [`flatten`] convert between
//! them without decoding the rest.

mod rle;


use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use thiserror::Error;

use crate::game::{
    Board, CELL_COUNT, Creature, GameState, Inventory, Layer, Position, Rng, Roster, SlipRoster,
    Tile, TrapSet,
};

/// Version byte of the uncompressed form.
pub const FLAT: u8 = 0x03;

/// Version byte of the run-length-compressed form.
pub const RLE: u8 = 0x04;

/// Click field value meaning no click is pending.
pub const NO_CLICK: u16 = 1025;

/// Bytes before the layers: version and protagonist word.
const HEADER_LEN: usize = 3;

/// Which of the two encodings to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Flat,
    Rle,
}

/// Errors raised while decoding or converting encoded state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown state version {0:#04x}")]
    UnknownVersion(u8),

    #[error("state data ends early")]
    Truncated,

    #[error("byte {0:#04x} is not a tile")]
    InvalidTile(u8),

    #[error("entity word {0:#06x} uses an unassigned kind")]
    InvalidEntity(u16),

    #[error("click target {0} is outside the board")]
    InvalidClick(u16),

    #[error("compressed layer expands past 1024 cells")]
    LayerOverflow,

    #[error("compressed layer holds only {0} cells")]
    LayerUnderflow(usize),

    #[error("{0} bytes follow the encoded state")]
    TrailingBytes(usize),

    #[error("sliding entity {0:#06x} matches no roster entry")]
    UnlinkedSlider(u16),
}

impl From<io::Error> for CodecError {
    fn from(_: io::Error) -> Self {
        CodecError::Truncated
    }
}

/// Encode `state` in the requested form.
pub fn encode(state: &GameState, form: Form) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 2 * CELL_COUNT + 64);
    out.push(match form {
        Form::Flat => FLAT,
        Form::Rle => RLE,
    });
    put_u16(&mut out, state.protagonist.bits());

    for layer in [Layer::Foreground, Layer::Background].map(|l| state.board.layer(l)) {
        let bytes: Vec<u8> = layer.iter().map(|tile| tile.byte()).collect();
        match form {
            Form::Flat => out.extend_from_slice(&bytes),
            Form::Rle => rle::encode_layer(&bytes, &mut out),
        }
    }

    put_u16(&mut out, state.tick);
    put_u16(&mut out, state.inventory.chips_left as u16);
    for key in state.inventory.keys {
        put_u16(&mut out, key);
    }
    for boot in state.inventory.boots {
        out.push(u8::from(boot));
    }
    put_u32(&mut out, state.rng.cursor());
    put_u16(&mut out, state.click.map_or(NO_CLICK, Position::raw));

    let traps = state.traps.as_bytes();
    put_u16(&mut out, traps.len() as u16);
    out.extend_from_slice(traps);

    put_u16(&mut out, state.roster.len() as u16);
    for creature in state.roster.iter() {
        put_u16(&mut out, creature.bits());
    }

    put_u16(&mut out, state.slip.len() as u16);
    for &index in state.slip.indices() {
        put_u16(&mut out, state.roster.get(index).bits());
    }

    out
}

/// Decode either form.
pub fn decode(bytes: &[u8]) -> Result<GameState, CodecError> {
    let flat = flatten(bytes)?;
    let mut reader = Cursor::new(&flat[HEADER_LEN..]);

    let protagonist = entity(BigEndian::read_u16(&flat[1..HEADER_LEN]))?;
    let foreground = read_layer(&mut reader)?;
    let background = read_layer(&mut reader)?;

    let tick = reader.read_u16::<BigEndian>()?;
    let chips_left = reader.read_i16::<BigEndian>()?;
    let mut keys = [0u16; 4];
    for key in &mut keys {
        *key = reader.read_u16::<BigEndian>()?;
    }
    let mut boots = [false; 4];
    for boot in &mut boots {
        *boot = reader.read_u8()? != 0;
    }
    let rng = Rng::from_cursor(reader.read_u32::<BigEndian>()?);
    let click = match reader.read_u16::<BigEndian>()? {
        NO_CLICK => None,
        raw => Some(Position::new(raw).ok_or(CodecError::InvalidClick(raw))?),
    };

    let trap_len = usize::from(reader.read_u16::<BigEndian>()?);
    let mut trap_bytes = vec![0u8; trap_len];
    reader.read_exact(&mut trap_bytes)?;

    let roster_len = usize::from(reader.read_u16::<BigEndian>()?);
    let mut creatures = Vec::with_capacity(roster_len);
    for _ in 0..roster_len {
        creatures.push(entity(reader.read_u16::<BigEndian>()?)?);
    }
    let roster = Roster::new(creatures);

    let slip_len = usize::from(reader.read_u16::<BigEndian>()?);
    let mut claimed = vec![false; roster.len()];
    let mut indices = Vec::with_capacity(slip_len);
    for _ in 0..slip_len {
        let word = reader.read_u16::<BigEndian>()?;
        let index = (0..roster.len())
            .find(|&i| !claimed[i] && roster.get(i).bits() == word)
            .ok_or(CodecError::UnlinkedSlider(word))?;
        claimed[index] = true;
        indices.push(index);
    }

    let trailing = flat.len() - HEADER_LEN - reader.position() as usize;
    if trailing > 0 {
        return Err(CodecError::TrailingBytes(trailing));
    }

    let mut state = GameState {
        board: Board::new(foreground, background),
        protagonist,
        roster,
        slip: SlipRoster::new(indices),
        inventory: Inventory {
            chips_left,
            keys,
            boots,
        },
        rng,
        tick,
        click,
        traps: TrapSet::from_bytes(&trap_bytes),
    };
    state.sync_sliding();
    Ok(state)
}

/// Convert flat bytes to the compressed form.
pub fn compress(flat: &[u8]) -> Result<Vec<u8>, CodecError> {
    match flat.first() {
        Some(&FLAT) => {}
        Some(&other) => return Err(CodecError::UnknownVersion(other)),
        None => return Err(CodecError::Truncated),
    }
    let layers_end = HEADER_LEN + 2 * CELL_COUNT;
    if flat.len() < layers_end {
        return Err(CodecError::Truncated);
    }

    let mut out = Vec::with_capacity(flat.len() / 4);
    out.push(RLE);
    out.extend_from_slice(&flat[1..HEADER_LEN]);
    rle::encode_layer(&flat[HEADER_LEN..HEADER_LEN + CELL_COUNT], &mut out);
    rle::encode_layer(&flat[HEADER_LEN + CELL_COUNT..layers_end], &mut out);
    out.extend_from_slice(&flat[layers_end..]);
    Ok(out)
}

/// Convert either form to flat bytes.
pub fn flatten(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let version = *bytes.first().ok_or(CodecError::Truncated)?;
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated);
    }
    match version {
        FLAT => Ok(bytes.to_vec()),
        RLE => {
            let mut out = Vec::with_capacity(bytes.len() + 2 * CELL_COUNT);
            out.push(FLAT);
            out.extend_from_slice(&bytes[1..HEADER_LEN]);
            let mut at = HEADER_LEN;
            for _ in 0..2 {
                let (layer, used) = rle::decode_layer(&bytes[at..])?;
                out.extend_from_slice(&layer);
                at += used;
            }
            out.extend_from_slice(&bytes[at..]);
            Ok(out)
        }
        other => Err(CodecError::UnknownVersion(other)),
    }
}

/// The protagonist word from the header of either form.
pub fn protagonist_word(bytes: &[u8]) -> Option<u16> {
    bytes.get(1..HEADER_LEN).map(BigEndian::read_u16)
}

fn entity(word: u16) -> Result<Creature, CodecError> {
    Creature::from_bits(word).ok_or(CodecError::InvalidEntity(word))
}

fn read_layer(reader: &mut Cursor<&[u8]>) -> Result<[Tile; CELL_COUNT], CodecError> {
    let mut bytes = [0u8; CELL_COUNT];
    reader.read_exact(&mut bytes)?;
    let mut layer = [Tile::Floor; CELL_COUNT];
    for (tile, byte) in layer.iter_mut().zip(bytes) {
        *tile = Tile::from_byte(byte).ok_or(CodecError::InvalidTile(byte))?;
    }
    Ok(layer)
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    let at = out.len();
    out.resize(at + 2, 0);
    BigEndian::write_u16(&mut out[at..], value);
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    let at = out.len();
    out.resize(at + 4, 0);
    BigEndian::write_u32(&mut out[at..], value);
}
