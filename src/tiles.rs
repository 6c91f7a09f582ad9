//! Tile ids and per-layer validity predicates.
//!
//! Every predicate is a pure function of the tile index.  Index 0 is the
//! empty tile and is rejected by all of them.

// ── Tile ids ─────────────────────────────────────────────────────────────────

pub const TILE_AIR: u8 = 0;
pub const TILE_SOLID: u8 = 1;
pub const TILE_DEATH: u8 = 2;
pub const TILE_NOHOOK: u8 = 3;
pub const TILE_NOLASER: u8 = 4;
pub const TILE_THROUGH_CUT: u8 = 5;
pub const TILE_THROUGH: u8 = 6;
pub const TILE_JUMP: u8 = 7;
pub const TILE_FREEZE: u8 = 9;
pub const TILE_TELEINEVIL: u8 = 10;
pub const TILE_UNFREEZE: u8 = 11;
pub const TILE_DFREEZE: u8 = 12;
pub const TILE_DUNFREEZE: u8 = 13;
pub const TILE_TELEINWEAPON: u8 = 14;
pub const TILE_TELEINHOOK: u8 = 15;
pub const TILE_WALLJUMP: u8 = 16;
pub const TILE_EHOOK_ENABLE: u8 = 17;
pub const TILE_EHOOK_DISABLE: u8 = 18;
pub const TILE_HIT_ENABLE: u8 = 19;
pub const TILE_HIT_DISABLE: u8 = 20;
pub const TILE_SOLO_ENABLE: u8 = 21;
pub const TILE_SOLO_DISABLE: u8 = 22;
/// Switch layer ids overlap the game layer's solo tiles.
pub const TILE_SWITCHTIMEDOPEN: u8 = 22;
pub const TILE_SWITCHTIMEDCLOSE: u8 = 23;
pub const TILE_SWITCHOPEN: u8 = 24;
pub const TILE_SWITCHCLOSE: u8 = 25;
pub const TILE_TELEIN: u8 = 26;
pub const TILE_TELEOUT: u8 = 27;
pub const TILE_BOOST: u8 = 28;
pub const TILE_TELECHECK: u8 = 29;
pub const TILE_TELECHECKOUT: u8 = 30;
pub const TILE_TELECHECKIN: u8 = 31;
pub const TILE_REFILL_JUMPS: u8 = 32;
pub const TILE_START: u8 = 33;
pub const TILE_FINISH: u8 = 34;
pub const TILE_CHECKPOINT_FIRST: u8 = 35;
pub const TILE_CHECKPOINT_LAST: u8 = 59;
pub const TILE_STOP: u8 = 60;
pub const TILE_STOPS: u8 = 61;
pub const TILE_STOPA: u8 = 62;
pub const TILE_TELECHECKINEVIL: u8 = 63;
pub const TILE_CP: u8 = 64;
pub const TILE_CP_F: u8 = 65;
pub const TILE_THROUGH_ALL: u8 = 66;
pub const TILE_THROUGH_DIR: u8 = 67;
pub const TILE_TUNE: u8 = 68;
pub const TILE_OLDLASER: u8 = 71;
pub const TILE_NPC: u8 = 72;
pub const TILE_EHOOK: u8 = 73;
pub const TILE_NOHIT: u8 = 74;
pub const TILE_NPH: u8 = 75;
pub const TILE_UNLOCK_TEAM: u8 = 76;
pub const TILE_PENALTY: u8 = 79;
pub const TILE_NPC_END: u8 = 88;
pub const TILE_SUPER_END: u8 = 89;
pub const TILE_JETPACK_END: u8 = 90;
pub const TILE_NPH_END: u8 = 91;
pub const TILE_BONUS: u8 = 95;
pub const TILE_TELE_GUN_ENABLE: u8 = 96;
pub const TILE_TELE_GUN_DISABLE: u8 = 97;
pub const TILE_ALLOW_TELE_GUN: u8 = 98;
pub const TILE_ALLOW_BLUE_TELE_GUN: u8 = 99;
pub const TILE_NPC_START: u8 = 104;
pub const TILE_SUPER_START: u8 = 105;
pub const TILE_JETPACK_START: u8 = 106;
pub const TILE_NPH_START: u8 = 107;
pub const TILE_TELE_GRENADE_ENABLE: u8 = 112;
pub const TILE_TELE_GRENADE_DISABLE: u8 = 113;
pub const TILE_TELE_LASER_ENABLE: u8 = 128;
pub const TILE_TELE_LASER_DISABLE: u8 = 129;
pub const TILE_CREDITS_1: u8 = 140;
pub const TILE_CREDITS_2: u8 = 141;
pub const TILE_CREDITS_3: u8 = 142;
pub const TILE_CREDITS_4: u8 = 143;
pub const TILE_LFREEZE: u8 = 144;
pub const TILE_LUNFREEZE: u8 = 145;
pub const TILE_CREDITS_5: u8 = 156;
pub const TILE_CREDITS_6: u8 = 157;
pub const TILE_CREDITS_7: u8 = 158;
pub const TILE_CREDITS_8: u8 = 159;
pub const TILE_ENTITIES_OFF_1: u8 = 190;
pub const TILE_ENTITIES_OFF_2: u8 = 191;

// ── Entity ids (relative to ENTITY_OFFSET) ───────────────────────────────────

/// Entities occupy the last four rows of the 16×16 grid.
pub const ENTITY_OFFSET: u8 = 255 - 16 * 4;

pub const ENTITY_SPAWN: u8 = 1;
pub const ENTITY_ARMOR_1: u8 = 6;
pub const ENTITY_LASER_O_FAST: u8 = 27;
pub const ENTITY_PLASMAE: u8 = 29;
pub const ENTITY_CRAZY_SHOTGUN: u8 = 34;
pub const ENTITY_ARMOR_SHOTGUN: u8 = 35;
pub const ENTITY_ARMOR_LASER: u8 = 38;
pub const ENTITY_DRAGGER_WEAK: u8 = 42;
pub const ENTITY_DRAGGER_STRONG_NW: u8 = 47;
pub const ENTITY_DOOR: u8 = 49;

/// Number of tiles in a 16×16 tileset.
pub const TILE_COUNT: usize = 256;

/// Tiles per row (and rows per image) of a tileset.
pub const TILES_PER_ROW: u32 = 16;

/// Grid cell `(column, row)` of `index` inside a 16×16 tileset.
pub fn tile_cell(index: u8) -> (u32, u32) {
    (index as u32 % TILES_PER_ROW, index as u32 / TILES_PER_ROW)
}

// ── Predicates ───────────────────────────────────────────────────────────────

/// Entity tiles placed in the last four rows of the game/front layers.
pub fn is_valid_entity(index: u8) -> bool {
    if index <= ENTITY_OFFSET {
        return false;
    }
    let entity = index - ENTITY_OFFSET;
    (ENTITY_SPAWN..=ENTITY_LASER_O_FAST).contains(&entity)
        || (ENTITY_PLASMAE..=ENTITY_CRAZY_SHOTGUN).contains(&entity)
        || (ENTITY_ARMOR_SHOTGUN..=ENTITY_ARMOR_LASER).contains(&entity)
        || (ENTITY_DRAGGER_WEAK..=ENTITY_DRAGGER_STRONG_NW).contains(&entity)
        || entity == ENTITY_DOOR
}

pub fn is_valid_game_tile(index: u8) -> bool {
    (TILE_SOLID..=TILE_NOLASER).contains(&index)
        || (TILE_THROUGH_CUT..=TILE_JUMP).contains(&index)
        || index == TILE_FREEZE
        || (TILE_UNFREEZE..=TILE_DUNFREEZE).contains(&index)
        || (TILE_WALLJUMP..=TILE_SOLO_DISABLE).contains(&index)
        || (TILE_REFILL_JUMPS..=TILE_STOPA).contains(&index)
        || (TILE_CP..=TILE_THROUGH_DIR).contains(&index)
        || (TILE_OLDLASER..=TILE_UNLOCK_TEAM).contains(&index)
        || index == TILE_PENALTY
        || (TILE_NPC_END..=TILE_NPH_END).contains(&index)
        || index == TILE_BONUS
        || (TILE_TELE_GUN_ENABLE..=TILE_TELE_GUN_DISABLE).contains(&index)
        || (TILE_NPC_START..=TILE_NPH_START).contains(&index)
        || (TILE_TELE_GRENADE_ENABLE..=TILE_TELE_GRENADE_DISABLE).contains(&index)
        || (TILE_TELE_LASER_ENABLE..=TILE_TELE_LASER_DISABLE).contains(&index)
        || is_credits_tile(index)
        || (TILE_LFREEZE..=TILE_LUNFREEZE).contains(&index)
        || (TILE_ENTITIES_OFF_1..=TILE_ENTITIES_OFF_2).contains(&index)
        || is_valid_entity(index)
}

pub fn is_valid_front_tile(index: u8) -> bool {
    index == TILE_DEATH
        || (TILE_NOLASER..=TILE_JUMP).contains(&index)
        || index == TILE_FREEZE
        || (TILE_UNFREEZE..=TILE_DUNFREEZE).contains(&index)
        || (TILE_WALLJUMP..=TILE_SOLO_DISABLE).contains(&index)
        || (TILE_REFILL_JUMPS..=TILE_STOPA).contains(&index)
        || (TILE_CP..=TILE_THROUGH_DIR).contains(&index)
        || (TILE_OLDLASER..=TILE_UNLOCK_TEAM).contains(&index)
        || index == TILE_PENALTY
        || (TILE_NPC_END..=TILE_NPH_END).contains(&index)
        || index == TILE_BONUS
        || (TILE_TELE_GUN_ENABLE..=TILE_TELE_GUN_DISABLE).contains(&index)
        || (TILE_NPC_START..=TILE_NPH_START).contains(&index)
        || (TILE_TELE_GRENADE_ENABLE..=TILE_TELE_GRENADE_DISABLE).contains(&index)
        || (TILE_TELE_LASER_ENABLE..=TILE_TELE_LASER_DISABLE).contains(&index)
        || (TILE_LFREEZE..=TILE_LUNFREEZE).contains(&index)
        || is_valid_entity(index)
}

pub fn is_valid_speedup_tile(index: u8) -> bool {
    index == TILE_BOOST
}

pub fn is_valid_switch_tile(index: u8) -> bool {
    index == TILE_JUMP
        || index == TILE_FREEZE
        || index == TILE_DFREEZE
        || index == TILE_DUNFREEZE
        || index == TILE_HIT_ENABLE
        || index == TILE_HIT_DISABLE
        || (TILE_SWITCHTIMEDOPEN..=TILE_SWITCHCLOSE).contains(&index)
        || index == TILE_ALLOW_TELE_GUN
        || index == TILE_ALLOW_BLUE_TELE_GUN
        || (is_valid_entity(index) && index >= ENTITY_OFFSET + ENTITY_ARMOR_1)
}

pub fn is_valid_tele_tile(index: u8) -> bool {
    matches!(
        index,
        TILE_TELEINEVIL
            | TILE_TELEINWEAPON
            | TILE_TELEINHOOK
            | TILE_TELEIN
            | TILE_TELEOUT
            | TILE_TELECHECK
            | TILE_TELECHECKOUT
            | TILE_TELECHECKIN
            | TILE_TELECHECKINEVIL
    )
}

pub fn is_valid_tune_tile(index: u8) -> bool {
    index == TILE_TUNE
}

/// Mapper credit tiles, hidden by the vanilla-style mods.
pub fn is_credits_tile(index: u8) -> bool {
    (TILE_CREDITS_1..=TILE_CREDITS_4).contains(&index)
        || (TILE_CREDITS_5..=TILE_CREDITS_8).contains(&index)
}

// ── Tests ────────────────────────────────────────────────────────────────────
