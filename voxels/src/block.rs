//! The closed set of block identities and the immutable per-identity metadata table.
//!
//! A `Block` carries no per-instance state. Its ordinal is also its on-disk encoding, so the
//! declaration order below must never change.

use std::collections::{hash_map, HashMap};

use serde::{Deserialize, Serialize};

/// Specification of how a block is textured. Each string names a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockTexture {
    /// Nothing is drawn (air, the null sentinel).
    None,
    /// The block has the given texture on all faces.
    Uniform(&'static str),
    /// One texture on the top and bottom faces, another on the four sides.
    Capped {
        cap: &'static str,
        side: &'static str,
    },
    /// The block has the given face textures on corresponding faces.
    Nonuniform {
        top: &'static str,
        bottom: &'static str,
        side: &'static str,
    },
    /// Front and back share a texture, left and right share another.
    Bench {
        top: &'static str,
        bottom: &'static str,
        front: &'static str,
        side: &'static str,
    },
    /// A single textured front face; top and bottom share the cap.
    Table {
        cap: &'static str,
        front: &'static str,
        side: &'static str,
    },
    /// A single textured front face; the bottom uses the side texture.
    Food {
        top: &'static str,
        front: &'static str,
        side: &'static str,
    },
}

/// Texture resource per face, resolved from a `BlockTexture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FaceTextures<T> {
    pub top: T,
    pub bottom: T,
    pub left: T,
    pub right: T,
    pub front: T,
    pub back: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockFlags {
    pub slab: bool,
    pub crop: bool,
    pub cross: bool,
    pub fire: bool,
    /// Light passes through the block.
    pub transparent: bool,
    /// Skylight lost while passing through a transparent block.
    pub attenuation: u8,
}

/// Specification of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub texture: BlockTexture,
    pub flags: BlockFlags,
}

impl BlockTexture {
    pub fn faces(&self) -> Option<FaceTextures<&'static str>> {
        use BlockTexture::*;

        let faces = |top, bottom, left, right, front, back| FaceTextures {
            top,
            bottom,
            left,
            right,
            front,
            back,
        };

        Some(match *self {
            None => return Option::None,
            Uniform(all) => faces(all, all, all, all, all, all),
            Capped { cap, side } => faces(cap, cap, side, side, side, side),
            Nonuniform { top, bottom, side } => faces(top, bottom, side, side, side, side),
            Bench {
                top,
                bottom,
                front,
                side,
            } => faces(top, bottom, side, side, front, front),
            Table { cap, front, side } => faces(cap, cap, side, side, front, side),
            Food { top, front, side } => faces(top, side, side, side, front, side),
        })
    }
}

impl BlockFlags {
    const fn solid() -> Self {
        BlockFlags {
            slab: false,
            crop: false,
            cross: false,
            fire: false,
            transparent: false,
            attenuation: 0,
        }
    }

    const fn clear(attenuation: u8) -> Self {
        BlockFlags {
            transparent: true,
            attenuation,
            ..Self::solid()
        }
    }

    const fn slab() -> Self {
        BlockFlags {
            slab: true,
            ..Self::clear(2)
        }
    }

    const fn cross() -> Self {
        BlockFlags {
            cross: true,
            ..Self::clear(0)
        }
    }

    const fn crop() -> Self {
        BlockFlags {
            crop: true,
            ..Self::clear(0)
        }
    }

    const fn fire() -> Self {
        BlockFlags {
            fire: true,
            ..Self::clear(0)
        }
    }
}

macro_rules! blocks {
    ($($variant:ident => ($name:literal, $display:literal, $texture:expr, $flags:expr),)*) => {
        /// Represents the identity of a single voxel in the world.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum Block {
            $($variant,)*
        }

        impl Block {
            /// Every identity, in ordinal order.
            pub const ALL: &'static [Block] = &[$(Block::$variant,)*];
        }

        static BLOCK_INFO: &[BlockInfo] = &[$(
            BlockInfo {
                name: $name,
                display_name: $display,
                texture: $texture,
                flags: $flags,
            },
        )*];
    };
}

use BlockTexture::{Bench, Capped, Food, Nonuniform, Table, Uniform};

blocks! {
    Air => ("air", "Air", BlockTexture::None, BlockFlags::clear(0)),
    Bedrock => ("bedrock", "Bedrock", Uniform("bedrock"), BlockFlags::solid()),
    Water => ("water", "Water", Uniform("water_0"), BlockFlags::clear(2)),
    Stone => ("stone", "Stone", Uniform("stone"), BlockFlags::solid()),
    Cobblestone => ("cobblestone", "Cobblestone", Uniform("cobblestone"), BlockFlags::solid()),
    Dirt => ("dirt", "Dirt", Uniform("dirt"), BlockFlags::solid()),
    Grass => ("grass", "Grass", Nonuniform { top: "grass_top", bottom: "dirt", side: "grass_side" }, BlockFlags::solid()),
    Mycelium => ("mycelium", "Mycelium", Nonuniform { top: "mycelium_top", bottom: "dirt", side: "mycelium_side" }, BlockFlags::solid()),
    Sand => ("sand", "Sand", Uniform("sand"), BlockFlags::solid()),
    Sandstone => ("sandstone", "Sandstone", Nonuniform { top: "sandstone_top", bottom: "sandstone_bottom", side: "sandstone_side" }, BlockFlags::solid()),
    Gravel => ("gravel", "Gravel", Uniform("gravel"), BlockFlags::solid()),
    Brick => ("brick", "Brick", Uniform("brick"), BlockFlags::solid()),
    Bookshelf => ("bookshelf", "Bookshelf", Capped { cap: "oak_planks", side: "bookshelf" }, BlockFlags::solid()),
    OakLog => ("oak_log", "Oak Log", Capped { cap: "oak_log_top", side: "oak_log_side" }, BlockFlags::solid()),
    OakPlanks => ("oak_planks", "Oak Planks", Uniform("oak_planks"), BlockFlags::solid()),
    OakLeaves => ("oak_leaves", "Oak Leaves", Uniform("oak_leaves"), BlockFlags::clear(1)),
    BirchLog => ("birch_log", "Birch Log", Capped { cap: "birch_log_top", side: "birch_log_side" }, BlockFlags::solid()),
    BirchPlanks => ("birch_planks", "Birch Planks", Uniform("birch_planks"), BlockFlags::solid()),
    BirchLeaves => ("birch_leaves", "Birch Leaves", Uniform("birch_leaves"), BlockFlags::clear(1)),
    RedMushroomBlock => ("red_mushroom_block", "Red Mushroom Block", Uniform("mushroom_block_red"), BlockFlags::solid()),
    BrownMushroomBlock => ("brown_mushroom_block", "Brown Mushroom Block", Uniform("mushroom_block_brown"), BlockFlags::solid()),
    MushroomStem => ("mushroom_stem", "Mushroom Stem", Capped { cap: "mushroom_block_stem_top", side: "mushroom_block_stem_side" }, BlockFlags::solid()),
    CoalOre => ("coal_ore", "Coal Ore", Uniform("coal_ore"), BlockFlags::solid()),
    IronOre => ("iron_ore", "Iron Ore", Uniform("iron_ore"), BlockFlags::solid()),
    GoldOre => ("gold_ore", "Gold Ore", Uniform("gold_ore"), BlockFlags::solid()),
    DiamondOre => ("diamond_ore", "Diamond Ore", Uniform("diamond_ore"), BlockFlags::solid()),
    EmeraldOre => ("emerald_ore", "Emerald Ore", Uniform("emerald_ore"), BlockFlags::solid()),
    WhiteWool => ("white_wool", "White Wool", Uniform("wool_colored_white"), BlockFlags::solid()),
    OrangeWool => ("orange_wool", "Orange Wool", Uniform("wool_colored_orange"), BlockFlags::solid()),
    MagentaWool => ("magenta_wool", "Magenta Wool", Uniform("wool_colored_magenta"), BlockFlags::solid()),
    LightBlueWool => ("light_blue_wool", "Light Blue Wool", Uniform("wool_colored_light_blue"), BlockFlags::solid()),
    YellowWool => ("yellow_wool", "Yellow Wool", Uniform("wool_colored_yellow"), BlockFlags::solid()),
    LimeWool => ("lime_wool", "Lime Wool", Uniform("wool_colored_lime"), BlockFlags::solid()),
    PinkWool => ("pink_wool", "Pink Wool", Uniform("wool_colored_pink"), BlockFlags::solid()),
    GrayWool => ("gray_wool", "Gray Wool", Uniform("wool_colored_gray"), BlockFlags::solid()),
    LightGrayWool => ("light_gray_wool", "Light Gray Wool", Uniform("wool_colored_silver"), BlockFlags::solid()),
    CyanWool => ("cyan_wool", "Cyan Wool", Uniform("wool_colored_cyan"), BlockFlags::solid()),
    PurpleWool => ("purple_wool", "Purple Wool", Uniform("wool_colored_purple"), BlockFlags::solid()),
    BlueWool => ("blue_wool", "Blue Wool", Uniform("wool_colored_blue"), BlockFlags::solid()),
    BrownWool => ("brown_wool", "Brown Wool", Uniform("wool_colored_brown"), BlockFlags::solid()),
    GreenWool => ("green_wool", "Green Wool", Uniform("wool_colored_green"), BlockFlags::solid()),
    RedWool => ("red_wool", "Red Wool", Uniform("wool_colored_red"), BlockFlags::solid()),
    BlackWool => ("black_wool", "Black Wool", Uniform("wool_colored_black"), BlockFlags::solid()),
    Glass => ("glass", "Glass", Uniform("glass"), BlockFlags::clear(0)),
    Rose => ("rose", "Rose", Uniform("rose"), BlockFlags::cross()),
    Dandelion => ("dandelion", "Dandelion", Uniform("dandelion"), BlockFlags::cross()),
    RedMushroom => ("red_mushroom", "Red Mushroom", Uniform("red_mushroom"), BlockFlags::cross()),
    BrownMushroom => ("brown_mushroom", "Brown Mushroom", Uniform("brown_mushroom"), BlockFlags::cross()),
    StoneSlab => ("stone_slab", "Stone Slab", Capped { cap: "stone_slab_top", side: "stone_slab_side" }, BlockFlags::slab()),
    SandstoneSlab => ("sandstone_slab", "Sandstone Slab", Nonuniform { top: "sandstone_top", bottom: "sandstone_bottom", side: "sandstone_side" }, BlockFlags::slab()),
    OakSlab => ("oak_slab", "Oak Slab", Uniform("oak_planks"), BlockFlags::slab()),
    BirchSlab => ("birch_slab", "Birch Slab", Uniform("birch_planks"), BlockFlags::slab()),
    CobblestoneSlab => ("cobblestone_slab", "Cobblestone Slab", Uniform("cobblestone"), BlockFlags::slab()),
    BrickSlab => ("brick_slab", "Brick Slab", Uniform("brick"), BlockFlags::slab()),
    DoubleStoneSlab => ("double_stone_slab", "Double Stone Slab", Capped { cap: "stone_slab_top", side: "stone_slab_side" }, BlockFlags::solid()),
    DoubleSandstoneSlab => ("double_sandstone_slab", "Double Sandstone Slab", Nonuniform { top: "sandstone_top", bottom: "sandstone_bottom", side: "sandstone_side" }, BlockFlags::solid()),
    DoubleOakSlab => ("double_oak_slab", "Double Oak Slab", Uniform("oak_planks"), BlockFlags::solid()),
    DoubleBirchSlab => ("double_birch_slab", "Double Birch Slab", Uniform("birch_planks"), BlockFlags::solid()),
    DoubleCobblestoneSlab => ("double_cobblestone_slab", "Double Cobblestone Slab", Uniform("cobblestone"), BlockFlags::solid()),
    DoubleBrickSlab => ("double_brick_slab", "Double Brick Slab", Uniform("brick"), BlockFlags::solid()),
    Reeds => ("reeds", "Reeds", Uniform("reeds"), BlockFlags::cross()),
    CraftingTable => ("crafting_table", "Crafting Table", Bench { top: "crafting_table_top", bottom: "oak_planks", front: "crafting_table_front", side: "crafting_table_side" }, BlockFlags::solid()),
    Furnace => ("furnace", "Furnace", Table { cap: "furnace_top", front: "furnace_front_off", side: "furnace_side" }, BlockFlags::solid()),
    BurningFurnace => ("burning_furnace", "Burning Furnace", Table { cap: "furnace_top", front: "furnace_front_on", side: "furnace_side" }, BlockFlags::solid()),
    Pumpkin => ("pumpkin", "Pumpkin", Food { top: "pumpkin_top", front: "pumpkin_face_off", side: "pumpkin_side" }, BlockFlags::solid()),
    JackOLantern => ("jack_o_lantern", "Jack o'Lantern", Food { top: "pumpkin_top", front: "pumpkin_face_on", side: "pumpkin_side" }, BlockFlags::solid()),
    Melon => ("melon", "Melon", Capped { cap: "melon_top", side: "melon_side" }, BlockFlags::solid()),
    DryFarmland => ("dry_farmland", "Dry Farmland", Nonuniform { top: "farmland_dry", bottom: "dirt", side: "dirt" }, BlockFlags::solid()),
    WetFarmland => ("wet_farmland", "Wet Farmland", Nonuniform { top: "farmland_wet", bottom: "dirt", side: "dirt" }, BlockFlags::solid()),
    Wheat0 => ("wheat_0", "Wheat", Uniform("wheat_stage_0"), BlockFlags::crop()),
    Wheat1 => ("wheat_1", "Wheat", Uniform("wheat_stage_1"), BlockFlags::crop()),
    Wheat2 => ("wheat_2", "Wheat", Uniform("wheat_stage_2"), BlockFlags::crop()),
    Wheat3 => ("wheat_3", "Wheat", Uniform("wheat_stage_3"), BlockFlags::crop()),
    Wheat4 => ("wheat_4", "Wheat", Uniform("wheat_stage_4"), BlockFlags::crop()),
    Wheat5 => ("wheat_5", "Wheat", Uniform("wheat_stage_5"), BlockFlags::crop()),
    Wheat6 => ("wheat_6", "Wheat", Uniform("wheat_stage_6"), BlockFlags::crop()),
    Wheat7 => ("wheat_7", "Wheat", Uniform("wheat_stage_7"), BlockFlags::crop()),
    Carrots0 => ("carrots_0", "Carrots", Uniform("carrots_stage_0"), BlockFlags::crop()),
    Carrots1 => ("carrots_1", "Carrots", Uniform("carrots_stage_1"), BlockFlags::crop()),
    Carrots2 => ("carrots_2", "Carrots", Uniform("carrots_stage_2"), BlockFlags::crop()),
    Carrots3 => ("carrots_3", "Carrots", Uniform("carrots_stage_3"), BlockFlags::crop()),
    Potatoes0 => ("potatoes_0", "Potatoes", Uniform("potatoes_stage_0"), BlockFlags::crop()),
    Potatoes1 => ("potatoes_1", "Potatoes", Uniform("potatoes_stage_1"), BlockFlags::crop()),
    Potatoes2 => ("potatoes_2", "Potatoes", Uniform("potatoes_stage_2"), BlockFlags::crop()),
    Potatoes3 => ("potatoes_3", "Potatoes", Uniform("potatoes_stage_3"), BlockFlags::crop()),
    Beetroots0 => ("beetroots_0", "Beetroots", Uniform("beetroots_stage_0"), BlockFlags::crop()),
    Beetroots1 => ("beetroots_1", "Beetroots", Uniform("beetroots_stage_1"), BlockFlags::crop()),
    Beetroots2 => ("beetroots_2", "Beetroots", Uniform("beetroots_stage_2"), BlockFlags::crop()),
    Beetroots3 => ("beetroots_3", "Beetroots", Uniform("beetroots_stage_3"), BlockFlags::crop()),
    OakSapling => ("oak_sapling", "Oak Sapling", Uniform("sapling_oak"), BlockFlags::cross()),
    BirchSapling => ("birch_sapling", "Birch Sapling", Uniform("sapling_birch"), BlockFlags::cross()),
    Fire => ("fire", "Fire", Uniform("fire_0"), BlockFlags::fire()),
    Null => ("null", "Null", BlockTexture::None, BlockFlags::solid()),
}

impl Block {
    #[inline]
    pub fn info(self) -> &'static BlockInfo {
        &BLOCK_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn by_name(name: &str) -> Option<Block> {
        Block::ALL.iter().copied().find(|block| block.name() == name)
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Decodes an ordinal. The null sentinel is never a valid stored identity, so it does not
    /// decode.
    #[inline]
    pub fn from_u8(val: u8) -> Option<Block> {
        match Block::ALL.get(val as usize) {
            Some(Block::Null) | None => None,
            Some(&block) => Some(block),
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == Block::Air
    }

    #[inline]
    pub fn is_slab(self) -> bool {
        self.info().flags.slab
    }

    #[inline]
    pub fn is_crop(self) -> bool {
        self.info().flags.crop
    }

    #[inline]
    pub fn is_cross(self) -> bool {
        self.info().flags.cross
    }

    #[inline]
    pub fn is_fire(self) -> bool {
        self.info().flags.fire
    }

    /// Skylight lost when passing through this block, or `None` if the block is opaque.
    #[inline]
    pub fn light_attenuation(self) -> Option<u8> {
        let flags = self.info().flags;
        if flags.transparent {
            Some(flags.attenuation)
        } else {
            None
        }
    }

    /// Blocks that stop a ray cast from the agent's eye.
    #[inline]
    pub fn is_not_permeable_ray(self) -> bool {
        !matches!(self, Block::Air | Block::Water | Block::Null)
    }

    /// Blocks that a moving agent collides with.
    #[inline]
    pub fn is_not_permeable_mob(self) -> bool {
        self.is_not_permeable_ray() && !self.is_cross() && !self.is_crop() && !self.is_fire()
    }

    /// True if fire may burn on top of this block.
    #[inline]
    pub fn is_fire_supporting(self) -> bool {
        !self.is_slab()
            && !self.is_crop()
            && !self.is_cross()
            && !self.is_fire()
            && self != Block::Air
            && self != Block::Null
    }

    /// Small plants that need a block beneath them to exist.
    pub fn is_plant(self) -> bool {
        (self.is_cross() && self != Block::Reeds) || self.is_crop()
    }

    pub fn slab_to_double_slab(self) -> Option<Block> {
        use Block::*;
        Some(match self {
            StoneSlab => DoubleStoneSlab,
            SandstoneSlab => DoubleSandstoneSlab,
            OakSlab => DoubleOakSlab,
            BirchSlab => DoubleBirchSlab,
            CobblestoneSlab => DoubleCobblestoneSlab,
            BrickSlab => DoubleBrickSlab,
            _ => return None,
        })
    }

    /// The final growth stage of a crop.
    pub fn is_final_stage(self) -> bool {
        use Block::*;
        matches!(self, Wheat7 | Carrots3 | Potatoes3 | Beetroots3)
    }

    /// The identity of the next growth stage of a crop, or `None` if this is not a crop or the
    /// crop is fully grown.
    pub fn next_growth_stage(self) -> Option<Block> {
        if !self.is_crop() || self.is_final_stage() {
            return None;
        }
        Block::ALL.get(self as usize + 1).copied()
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::Air
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Assigns each distinct texture resource a dense layer index, in block order.
pub fn texture_index_map() -> HashMap<&'static str, usize> {
    let mut index_map: HashMap<&'static str, usize> = HashMap::new();
    let mut index = 0;

    let mut insert = |face_tex: &'static str| -> usize {
        let entry = index_map.entry(face_tex);
        match entry {
            hash_map::Entry::Occupied(entry) => *entry.get(),
            hash_map::Entry::Vacant(entry) => {
                let res = *entry.insert(index);
                index += 1;
                res
            }
        }
    };

    for block in Block::ALL {
        if let Some(faces) = block.info().texture.faces() {
            let top = insert(faces.top);
            let bottom = insert(faces.bottom);
            insert(faces.left);
            insert(faces.right);
            insert(faces.front);
            insert(faces.back);

            log::debug!(
                "Block {} gets texture indices {}/{} (top/bottom)",
                block.name(),
                top,
                bottom
            );
        }
    }

    index_map
}

/// Resolves the texture layer of every face of a block.
pub fn face_layers(
    block: Block,
    index_map: &HashMap<&'static str, usize>,
) -> Option<FaceTextures<usize>> {
    let faces = block.info().texture.faces()?;
    let layer = |name: &str| index_map.get(name).copied();

    Some(FaceTextures {
        top: layer(faces.top)?,
        bottom: layer(faces.bottom)?,
        left: layer(faces.left)?,
        right: layer(faces.right)?,
        front: layer(faces.front)?,
        back: layer(faces.back)?,
    })
}
