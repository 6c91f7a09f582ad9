use serde::Deserialize;

use crate::entities::GameplayVariant;

/// Game-mode flags announced by the server.
///
/// Only the entity-related bits are kept; they select which entity overlay
/// image is shown and which overlay layers the mode uses at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameInfo {
    pub entities_ddnet: bool,
    pub entities_ddrace: bool,
    pub entities_race: bool,
    pub entities_blockworlds: bool,
    pub entities_fng: bool,
    pub entities_vanilla: bool,
    /// Show the unmasked ddnet/ddrace images instead of the masked ones.
    pub dont_mask_entities: bool,
}

impl GameInfo {
    /// Variant whose entity image applies, highest priority first.
    pub fn entities_variant(&self) -> GameplayVariant {
        let masked = !self.dont_mask_entities;
        if self.entities_ddnet && masked {
            GameplayVariant::DDNet
        } else if self.entities_ddrace && masked {
            GameplayVariant::DDRace
        } else if self.entities_race {
            GameplayVariant::Race
        } else if self.entities_blockworlds {
            GameplayVariant::BlockWorlds
        } else if self.entities_fng {
            GameplayVariant::FNG
        } else if self.entities_vanilla {
            GameplayVariant::Vanilla
        } else {
            GameplayVariant::Unknown
        }
    }

    fn is_ddrace_family(&self) -> bool {
        self.entities_ddnet || self.entities_ddrace
    }

    pub fn has_front_layer(&self) -> bool {
        self.is_ddrace_family()
    }

    pub fn has_speedup_layer(&self) -> bool {
        self.is_ddrace_family()
    }

    pub fn has_switch_layer(&self) -> bool {
        self.is_ddrace_family()
    }

    pub fn has_tele_layer(&self) -> bool {
        self.is_ddrace_family()
    }

    pub fn has_tune_layer(&self) -> bool {
        self.is_ddrace_family()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_is_unknown() {
        assert_eq!(GameInfo::default().entities_variant(), GameplayVariant::Unknown);
    }

    #[test]
    fn ddnet_wins_over_everything() {
        let info = GameInfo { entities_ddnet: true, entities_vanilla: true, ..Default::default() };
        assert_eq!(info.entities_variant(), GameplayVariant::DDNet);
    }

    #[test]
    fn dont_mask_skips_ddnet_and_ddrace() {
        let info = GameInfo {
            entities_ddnet: true,
            entities_ddrace: true,
            dont_mask_entities: true,
            ..Default::default()
        };
        assert_eq!(info.entities_variant(), GameplayVariant::Unknown);

        let info = GameInfo { entities_fng: true, ..info };
        assert_eq!(info.entities_variant(), GameplayVariant::FNG);
    }

    #[test]
    fn ddrace_family_has_extra_layers() {
        let info = GameInfo { entities_ddrace: true, ..Default::default() };
        assert!(info.has_front_layer() && info.has_tele_layer() && info.has_tune_layer());
        let info = GameInfo { entities_race: true, ..Default::default() };
        assert!(!info.has_switch_layer() && !info.has_speedup_layer());
    }
}
