//! Toy battle simulation between two Pokémon
//!
//! Each contestant is reduced to a handful of integers derived from its
//! base stats. Rounds alternate single blows: a blow lands when an
//! experience-scaled roll beats the defender's parry, and damage is a roll
//! bounded by the attacker's attack scaled against the defender's defense.
//! The first side to reach zero health loses.

use rand::Rng;

use crate::data::Pokemon;

/// Flat bonus added to every to-hit roll
const HIT_BONUS: i64 = 30;

/// Safety bound on rounds; two contestants that cannot damage each other
/// end in a draw instead of looping forever.
const MAX_ROUNDS: u32 = 500;

/// Combat-relevant numbers for one contestant
#[derive(Debug, Clone)]
pub struct Battler {
    pub name: String,
    pub health: i64,
    pub attack: i64,
    pub defense: i64,
    pub experience: i64,
    pub parry: i64,
}

impl Battler {
    /// Derives a battler from a Pokémon record.
    ///
    /// Stats absent from the record come out as the minimum useful value so
    /// the roll ranges below are never empty.
    pub fn from_pokemon(pokemon: &Pokemon) -> Self {
        Self {
            name: pokemon.name.clone(),
            health: i64::from(pokemon.base_stat("hp").max(1)),
            attack: i64::from(pokemon.base_stat("attack").max(1)),
            defense: i64::from(pokemon.base_stat("defense").max(1)),
            experience: i64::from(pokemon.base_experience.max(1)),
            parry: i64::from(pokemon.base_stat("speed")),
        }
    }
}

/// One observable step of a battle, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// A blow landed, leaving the defender at `remaining` health
    Hit {
        attacker: String,
        defender: String,
        remaining: i64,
    },
    /// The attacker's blow was parried
    Miss { attacker: String },
    /// The battle is over
    Win { winner: String },
    /// Neither side could finish the other within the round bound
    Draw,
}

/// Runs a full battle, returning its events ending in `Win` or `Draw`.
///
/// The RNG is injected so tests can replay battles with a seeded generator.
pub fn simulate<R: Rng>(mut first: Battler, mut second: Battler, rng: &mut R) -> Vec<BattleEvent> {
    let mut events = Vec::new();

    for _ in 0..MAX_ROUNDS {
        if strike(&mut first, &mut second, rng, &mut events) {
            return events;
        }
        if strike(&mut second, &mut first, rng, &mut events) {
            return events;
        }
    }

    events.push(BattleEvent::Draw);
    events
}

/// One blow from `attacker` against `defender`; true when the battle ended
fn strike<R: Rng>(
    attacker: &mut Battler,
    defender: &mut Battler,
    rng: &mut R,
    events: &mut Vec<BattleEvent>,
) -> bool {
    let to_hit = rng.gen_range(0..attacker.experience) + HIT_BONUS;
    if to_hit <= defender.parry {
        events.push(BattleEvent::Miss {
            attacker: attacker.name.clone(),
        });
        return false;
    }

    let damage_bound = (attacker.attack * defender.defense / 100).max(1);
    let damage = rng.gen_range(0..damage_bound);
    defender.health -= damage;

    events.push(BattleEvent::Hit {
        attacker: attacker.name.clone(),
        defender: defender.name.clone(),
        remaining: defender.health.max(0),
    });

    if defender.health <= 0 {
        events.push(BattleEvent::Win {
            winner: attacker.name.clone(),
        });
        return true;
    }
    false
}

/// Rolls whether a catch attempt succeeds.
///
/// A uniform roll over the Pokémon's base experience plus a flat bonus must
/// reach the base experience itself, so weak Pokémon are caught every time
/// and strong ones usually escape.
pub fn catch_roll<R: Rng>(base_experience: u32, rng: &mut R) -> bool {
    const CATCH_BONUS: u32 = 50;
    let experience = base_experience.max(1);
    let chance = rng.gen_range(0..experience) + CATCH_BONUS;
    base_experience <= chance
}
