//! Tile markers
//!
//! Byte values follow the MS tile codes so a layer is a plain byte array
//! at the codec boundary. Values `0x70..` are never tiles, which leaves the
//! run-length escape and terminator bytes unambiguous.

use serde::{Deserialize, Serialize};

use super::position::Direction;

macro_rules! tiles {
    ($($name:ident = $value:literal),+ $(,)?) => {
        /// Every terrain, item and occupant marker a layer cell can hold.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        #[repr(u8)]
        pub enum Tile {
            $($name = $value),+
        }

        impl Tile {
            /// Decode a layer byte.
            pub fn from_byte(byte: u8) -> Option<Tile> {
                match byte {
                    $($value => Some(Tile::$name),)+
                    _ => None,
                }
            }
        }
    };
}

tiles! {
    Floor = 0x00,
    Wall = 0x01,
    Chip = 0x02,
    Water = 0x03,
    Fire = 0x04,
    HiddenWallPerm = 0x05,
    ThinWallUp = 0x06,
    ThinWallLeft = 0x07,
    ThinWallDown = 0x08,
    ThinWallRight = 0x09,
    Block = 0x0A,
    Dirt = 0x0B,
    Ice = 0x0C,
    ForceDown = 0x0D,
    CloneBlockUp = 0x0E,
    CloneBlockLeft = 0x0F,
    CloneBlockDown = 0x10,
    CloneBlockRight = 0x11,
    ForceUp = 0x12,
    ForceRight = 0x13,
    ForceLeft = 0x14,
    Exit = 0x15,
    DoorBlue = 0x16,
    DoorRed = 0x17,
    DoorGreen = 0x18,
    DoorYellow = 0x19,
    IceSouthEast = 0x1A,
    IceSouthWest = 0x1B,
    IceNorthWest = 0x1C,
    IceNorthEast = 0x1D,
    BlueWallFake = 0x1E,
    BlueWallReal = 0x1F,
    OverlayBuffer = 0x20,
    Thief = 0x21,
    Socket = 0x22,
    ButtonGreen = 0x23,
    ButtonRed = 0x24,
    ToggleClosed = 0x25,
    ToggleOpen = 0x26,
    ButtonBrown = 0x27,
    ButtonBlue = 0x28,
    Teleport = 0x29,
    Bomb = 0x2A,
    Trap = 0x2B,
    HiddenWallTemp = 0x2C,
    Gravel = 0x2D,
    PopUpWall = 0x2E,
    Hint = 0x2F,
    ThinWallDownRight = 0x30,
    CloneMachine = 0x31,
    ForceRandom = 0x32,
    DrownedChip = 0x33,
    BurnedChip = 0x34,
    BombedChip = 0x35,
    Unused36 = 0x36,
    Unused37 = 0x37,
    IceBlockStatic = 0x38,
    ExitedChip = 0x39,
    ExitExtra1 = 0x3A,
    ExitExtra2 = 0x3B,
    SwimmingUp = 0x3C,
    SwimmingLeft = 0x3D,
    SwimmingDown = 0x3E,
    SwimmingRight = 0x3F,
    BugUp = 0x40,
    BugLeft = 0x41,
    BugDown = 0x42,
    BugRight = 0x43,
    FireballUp = 0x44,
    FireballLeft = 0x45,
    FireballDown = 0x46,
    FireballRight = 0x47,
    PinkBallUp = 0x48,
    PinkBallLeft = 0x49,
    PinkBallDown = 0x4A,
    PinkBallRight = 0x4B,
    TankUp = 0x4C,
    TankLeft = 0x4D,
    TankDown = 0x4E,
    TankRight = 0x4F,
    GliderUp = 0x50,
    GliderLeft = 0x51,
    GliderDown = 0x52,
    GliderRight = 0x53,
    TeethUp = 0x54,
    TeethLeft = 0x55,
    TeethDown = 0x56,
    TeethRight = 0x57,
    WalkerUp = 0x58,
    WalkerLeft = 0x59,
    WalkerDown = 0x5A,
    WalkerRight = 0x5B,
    BlobUp = 0x5C,
    BlobLeft = 0x5D,
    BlobDown = 0x5E,
    BlobRight = 0x5F,
    ParameciumUp = 0x60,
    ParameciumLeft = 0x61,
    ParameciumDown = 0x62,
    ParameciumRight = 0x63,
    KeyBlue = 0x64,
    KeyRed = 0x65,
    KeyGreen = 0x66,
    KeyYellow = 0x67,
    BootsWater = 0x68,
    BootsFire = 0x69,
    BootsIce = 0x6A,
    BootsSlide = 0x6B,
    ChipUp = 0x6C,
    ChipLeft = 0x6D,
    ChipDown = 0x6E,
    ChipRight = 0x6F,
}

/// First monster tile; monster tiles are `MONSTER_BASE + 4 * kind + dir`.
pub(crate) const MONSTER_BASE: u8 = 0x40;

impl Tile {
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Tile at `base + offset`. Callers only offset within a known range.
    pub(crate) fn offset(base: Tile, offset: u8) -> Tile {
        Tile::from_byte(base.byte() + offset).unwrap_or(base)
    }

    /// The facing encoded by the low two bits of directional tiles.
    pub fn facing(self) -> Direction {
        Direction::from_bits(self.byte())
    }

    pub fn is_monster(self) -> bool {
        (Tile::BugUp.byte()..=Tile::ParameciumRight.byte()).contains(&self.byte())
    }

    pub fn is_clone_block(self) -> bool {
        (Tile::CloneBlockUp.byte()..=Tile::CloneBlockRight.byte()).contains(&self.byte())
    }

    /// Tiles a clone machine can copy into a fresh entity.
    pub fn is_creature(self) -> bool {
        self.is_monster() || self.is_clone_block() || self == Tile::Block
    }

    pub fn is_chip(self) -> bool {
        (Tile::ChipUp.byte()..=Tile::ChipRight.byte()).contains(&self.byte())
    }

    pub fn is_swimming_chip(self) -> bool {
        (Tile::SwimmingUp.byte()..=Tile::SwimmingRight.byte()).contains(&self.byte())
    }

    /// Occupants that leave the buried tile in charge of entry rules.
    pub fn is_transparent(self) -> bool {
        self.byte() >= Tile::SwimmingUp.byte()
    }

    pub fn is_ice(self) -> bool {
        matches!(
            self,
            Tile::Ice
                | Tile::IceSouthEast
                | Tile::IceSouthWest
                | Tile::IceNorthWest
                | Tile::IceNorthEast
        )
    }

    pub fn is_force_floor(self) -> bool {
        matches!(
            self,
            Tile::ForceDown
                | Tile::ForceUp
                | Tile::ForceRight
                | Tile::ForceLeft
                | Tile::ForceRandom
        )
    }

    /// Terrain that keeps whatever stands on it moving.
    pub fn is_sliding(self) -> bool {
        self.is_ice() || self.is_force_floor() || self == Tile::Teleport
    }

    pub fn is_toggle(self) -> bool {
        matches!(self, Tile::ToggleOpen | Tile::ToggleClosed)
    }

    /// Open toggle doors close and closed ones open; everything else is kept.
    pub fn toggled(self) -> Tile {
        match self {
            Tile::ToggleOpen => Tile::ToggleClosed,
            Tile::ToggleClosed => Tile::ToggleOpen,
            other => other,
        }
    }

    /// Clone-machine template for a block facing `direction`.
    pub fn clone_block(direction: Direction) -> Tile {
        Tile::offset(Tile::CloneBlockUp, direction.bits())
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> u8 {
        tile.byte()
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Tile::from_byte(byte).ok_or_else(|| format!("unknown tile byte {byte:#04x}"))
    }
}
