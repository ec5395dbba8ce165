// /schema.rs
use crate::settings::Variant;

/// Namespaced key the sheet is stored under, both in the local slot store and
/// in scene/token metadata.
pub const META_KEY: &str = "theodore.woin.sheet";

/// The ten W.O.I.N. ability scores, in sheet order.
pub const ABILITIES: [&str; 10] = [
    "str", "agi", "end", "int", "log", "wil", "cha", "luc", "rep", "pow",
];

const IDENTITY_INTEGRATED: [&str; 4] = ["name", "species", "career", "grade"];
const IDENTITY_STANDALONE: [&str; 4] = ["name", "species", "descriptor", "grade"];

const DICE_BADGES: [&str; 10] = [
    "str_dice", "agi_dice", "end_dice", "int_dice", "log_dice", "wil_dice", "cha_dice",
    "luc_dice", "rep_dice", "pow_dice",
];

const VITALS: [&str; 3] = ["health", "soak", "initiative"];

const STANDALONE_COMBAT_EXTRAS: [&str; 5] = [
    "perception",
    "carry",
    "actions",
    "natural_damage",
    "pow_points",
];

const DEFENSES: [&str; 4] = ["melee", "ranged", "mental", "vital"];

const MOVEMENT: [&str; 4] = ["speed", "climb", "swim", "jump"];

const NOTES: [&str; 3] = ["skills-text", "exploits-text", "gear-text"];

const STANDALONE_TAIL: [&str; 3] = ["experience_points", "wealth", "current_age"];

// A derived field holding the sum of two other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedSum {
    pub output: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

/// Fixed, ordered shape of a character record.
///
/// Besides the field list the schema carries which fields trigger a
/// recomputation on input, the initiative sum and whether the per-ability
/// `<attr>_dice` badges are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<&'static str>,
    reactive: Vec<&'static str>,
    initiative: DerivedSum,
    dice_badges: bool,
}

impl FieldSchema {
    // Schema of the sheet embedded in the virtual tabletop. Its dice badges are
    // plain user input.
    pub fn integrated() -> Self {
        let mut fields = Vec::with_capacity(34);
        fields.extend(IDENTITY_INTEGRATED);
        fields.extend(ABILITIES);
        fields.extend(DICE_BADGES);
        fields.extend(VITALS);
        fields.extend(DEFENSES);
        fields.extend(NOTES);
        Self::from_fields(fields, false)
    }

    // Schema of the standalone sheet, which tracks a few more entries and
    // derives the dice badges from the ability scores.
    pub fn standalone() -> Self {
        let mut fields = Vec::with_capacity(46);
        fields.extend(IDENTITY_STANDALONE);
        fields.extend(ABILITIES);
        fields.extend(DICE_BADGES);
        fields.extend(VITALS);
        fields.extend(STANDALONE_COMBAT_EXTRAS);
        fields.extend(DEFENSES);
        fields.extend(MOVEMENT);
        fields.extend(NOTES);
        fields.extend(STANDALONE_TAIL);
        Self::from_fields(fields, true)
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Standalone => Self::standalone(),
            Variant::Integrated => Self::integrated(),
        }
    }

    fn from_fields(fields: Vec<&'static str>, dice_badges: bool) -> Self {
        let mut reactive = ABILITIES.to_vec();
        reactive.push("grade");
        Self {
            fields,
            reactive,
            initiative: DerivedSum {
                output: "initiative",
                left: "agi",
                right: "log",
            },
            dice_badges,
        }
    }

    pub fn with_dice_badges(mut self, enabled: bool) -> Self {
        self.dice_badges = enabled;
        self
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // Returns the schema's own static identifier for `id`, if it is part of the schema.
    pub fn field(&self, id: &str) -> Option<&'static str> {
        self.fields.iter().copied().find(|field| *field == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    pub fn is_reactive(&self, id: &str) -> bool {
        self.reactive.iter().any(|field| *field == id)
    }

    pub fn initiative(&self) -> DerivedSum {
        self.initiative
    }

    pub fn dice_badges(&self) -> bool {
        self.dice_badges
    }

    // Pairs of (ability, badge field) for every badge present in the schema.
    pub fn badge_fields(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        ABILITIES
            .iter()
            .zip(DICE_BADGES.iter())
            .filter(|(_, badge)| self.contains(badge))
            .map(|(ability, badge)| (*ability, *badge))
    }

    /// True for fields that are recomputed and never taken as user input.
    pub fn is_derived(&self, id: &str) -> bool {
        if id == self.initiative.output {
            return true;
        }
        self.dice_badges && self.badge_fields().any(|(_, badge)| badge == id)
    }
}
