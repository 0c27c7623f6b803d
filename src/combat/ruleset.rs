//! Data-Driven Duel Configuration
//!
//! The skill tables and match settings are loaded from `assets/config/skills.ron`.
//! Instead of hardcoding skill stats in Rust, skills are defined as data and
//! resolved into a [`Ruleset`] once, at load time.
//!
//! ## Benefits
//! - Balance changes don't require recompilation
//! - Unknown or inconsistent skill entries are rejected before a match starts
//! - The engine never looks up a skill that doesn't exist
//!
//! ## Usage
//! ```ignore
//! let ruleset = Ruleset::load_from_file(Path::new("assets/config/skills.ron"))?;
//! let skill = ruleset.skill(SkillId::PlayerAttack).unwrap();
//! println!("{} deals {}", skill.name, skill.damage);
//! ```

use bevy::log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::constants::*;
use super::skills::{Skill, SkillConfig, SkillId, SkillKind};
use super::state::ActorId;

/// Skill table shipped with the crate.
const BUILTIN_SKILLS_RON: &str = include_str!("../../assets/config/skills.ron");

fn default_match_duration() -> u64 {
    DEFAULT_MATCH_DURATION_MS
}

fn default_gcd() -> u64 {
    DEFAULT_GCD_MS
}

fn default_player_max_hp() -> u32 {
    DEFAULT_PLAYER_MAX_HP
}

fn default_ai_max_hp() -> u32 {
    DEFAULT_AI_MAX_HP
}

fn default_player_name() -> String {
    "Wanderer".to_string()
}

fn default_ai_name() -> String {
    "Sword Saint's Reflection".to_string()
}

/// Match-wide settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Match length in milliseconds
    #[serde(default = "default_match_duration")]
    pub match_duration_ms: u64,
    /// Shared cooldown for skills that don't set their own
    #[serde(default = "default_gcd")]
    pub gcd_ms: u64,
    #[serde(default = "default_player_max_hp")]
    pub player_max_hp: u32,
    #[serde(default = "default_ai_max_hp")]
    pub ai_max_hp: u32,
    #[serde(default = "default_player_name")]
    pub player_name: String,
    #[serde(default = "default_ai_name")]
    pub ai_name: String,
    /// Emit AI decision diagnostics
    #[serde(default)]
    pub debug_ai: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            match_duration_ms: DEFAULT_MATCH_DURATION_MS,
            gcd_ms: DEFAULT_GCD_MS,
            player_max_hp: DEFAULT_PLAYER_MAX_HP,
            ai_max_hp: DEFAULT_AI_MAX_HP,
            player_name: default_player_name(),
            ai_name: default_ai_name(),
            debug_ai: false,
        }
    }
}

/// Root structure of the skills.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct RulesetConfig {
    #[serde(default)]
    pub settings: MatchSettings,
    pub skills: HashMap<SkillId, SkillConfig>,
    /// Player skills in skill-bar order
    pub player_loadout: Vec<SkillId>,
    /// AI skills; the order is the AI's evaluation order
    pub ai_loadout: Vec<SkillId>,
}

/// Validated settings plus skill tables for both sides.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub settings: MatchSettings,
    skills: HashMap<SkillId, Skill>,
    player_loadout: Vec<SkillId>,
    ai_loadout: Vec<SkillId>,
}

impl Default for Ruleset {
    /// The built-in tables. They are compiled in and covered by tests, so
    /// failing to parse them is a build defect rather than a runtime condition.
    fn default() -> Self {
        Self::from_ron_str(BUILTIN_SKILLS_RON).expect("Built-in skill table must be valid")
    }
}

impl Ruleset {
    /// Resolve and validate a parsed config.
    pub fn new(config: RulesetConfig) -> Result<Self, String> {
        let settings = config.settings;
        validate_settings(&settings)?;

        let mut skills = HashMap::with_capacity(config.skills.len());
        for (id, skill_config) in config.skills {
            let skill = resolve_skill(id, skill_config, &settings)?;
            skills.insert(id, skill);
        }

        validate_loadout("player_loadout", &config.player_loadout, &skills)?;
        validate_loadout("ai_loadout", &config.ai_loadout, &skills)?;

        Ok(Self {
            settings,
            skills,
            player_loadout: config.player_loadout,
            ai_loadout: config.ai_loadout,
        })
    }

    /// Parse RON text into a validated ruleset.
    pub fn from_ron_str(contents: &str) -> Result<Self, String> {
        let config: RulesetConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse skill table: {}", e))?;
        Self::new(config)
    }

    /// Load a skill table from disk.
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        let ruleset = Self::from_ron_str(&contents)
            .map_err(|e| format!("{}: {}", path.display(), e))?;

        info!(
            "Loaded {} skill definitions from {}",
            ruleset.skills.len(),
            path.display()
        );
        Ok(ruleset)
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(&id)
    }

    /// Skills available to an actor, in loadout order.
    pub fn loadout(&self, actor: ActorId) -> &[SkillId] {
        match actor {
            ActorId::Player => &self.player_loadout,
            ActorId::Ai => &self.ai_loadout,
        }
    }

    pub fn has_skill(&self, actor: ActorId, id: SkillId) -> bool {
        self.loadout(actor).contains(&id)
    }

    /// Resolved skills of an actor, in loadout order.
    pub fn loadout_skills(&self, actor: ActorId) -> impl Iterator<Item = &Skill> + '_ {
        self.loadout(actor).iter().filter_map(|id| self.skills.get(id))
    }

    pub fn max_hp(&self, actor: ActorId) -> u32 {
        match actor {
            ActorId::Player => self.settings.player_max_hp,
            ActorId::Ai => self.settings.ai_max_hp,
        }
    }

    pub fn actor_name(&self, actor: ActorId) -> &str {
        match actor {
            ActorId::Player => &self.settings.player_name,
            ActorId::Ai => &self.settings.ai_name,
        }
    }

    /// Number of defined skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn validate_settings(settings: &MatchSettings) -> Result<(), String> {
    if settings.match_duration_ms == 0 {
        return Err("match_duration_ms must be positive".to_string());
    }
    if settings.player_max_hp == 0 || settings.ai_max_hp == 0 {
        return Err("max hp must be positive for both actors".to_string());
    }
    Ok(())
}

fn resolve_skill(id: SkillId, config: SkillConfig, settings: &MatchSettings) -> Result<Skill, String> {
    if config.name.trim().is_empty() {
        return Err(format!("{}: name must not be empty", id));
    }

    match config.kind {
        SkillKind::Interrupt if config.cast_time_ms > 0 => {
            return Err(format!("{}: interrupt skills must be instant", id));
        }
        SkillKind::Defensive => {
            let reduction = config
                .damage_reduction
                .ok_or_else(|| format!("{}: defensive skills need damage_reduction", id))?;
            if !(0.0..=1.0).contains(&reduction) {
                return Err(format!(
                    "{}: damage_reduction {} is outside [0, 1]",
                    id, reduction
                ));
            }
            if config.buff_duration_ms == Some(0) {
                return Err(format!("{}: buff_duration_ms must be positive", id));
            }
        }
        _ => {}
    }

    Ok(Skill {
        id,
        name: config.name,
        kind: config.kind,
        damage: config.damage,
        cast_time_ms: config.cast_time_ms,
        cooldown_ms: config.cooldown_ms,
        triggers_gcd: config.triggers_gcd,
        gcd_ms: if config.triggers_gcd {
            config.gcd_ms.unwrap_or(settings.gcd_ms)
        } else {
            0
        },
        damage_reduction: config.damage_reduction,
        buff_duration_ms: config.buff_duration_ms.unwrap_or(DEFAULT_BUFF_DURATION_MS),
        color: config.color,
        interruptible: config.interruptible,
        icon: config.icon,
    })
}

fn validate_loadout(
    label: &str,
    loadout: &[SkillId],
    skills: &HashMap<SkillId, Skill>,
) -> Result<(), String> {
    if loadout.is_empty() {
        return Err(format!("{} must contain at least one skill", label));
    }

    let missing: Vec<&str> = loadout
        .iter()
        .filter(|id| !skills.contains_key(id))
        .map(|id| id.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(format!(
            "{} references undefined skills: {}",
            label,
            missing.join(", ")
        ));
    }

    for (i, id) in loadout.iter().enumerate() {
        if loadout[..i].contains(id) {
            return Err(format!("{} lists {} more than once", label, id));
        }
    }

    Ok(())
}
