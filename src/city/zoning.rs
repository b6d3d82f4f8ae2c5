//! Zone types and RCI demand

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CityParams;
use crate::error::Result;
use crate::weighted::WeightedTable;

/// What a city block is zoned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneType {
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    Office,
    Mixed,
    Park,
    Special,
}

impl ZoneType {
    pub const ALL: [ZoneType; 8] = [
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Industrial,
        ZoneType::Agricultural,
        ZoneType::Office,
        ZoneType::Mixed,
        ZoneType::Park,
        ZoneType::Special,
    ];

    /// Zones growth may pick on its own. Special blocks are only placed by hand.
    pub const GROWABLE: [ZoneType; 7] = [
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Industrial,
        ZoneType::Agricultural,
        ZoneType::Office,
        ZoneType::Mixed,
        ZoneType::Park,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Map glyph for lots of this zone.
    pub fn letter(self) -> char {
        match self {
            ZoneType::Residential => 'R',
            ZoneType::Commercial => 'C',
            ZoneType::Industrial => 'I',
            ZoneType::Agricultural => 'A',
            ZoneType::Office => 'O',
            ZoneType::Mixed => 'M',
            ZoneType::Park => 'P',
            ZoneType::Special => 'S',
        }
    }
}

/// Extra instructions for what goes on a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoningParameters {
    #[default]
    None,
    Fountain,
}

/// Blocks built per zone type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    counts: [u32; 8],
}

impl ZoneCounts {
    pub fn get(&self, zone: ZoneType) -> u32 {
        self.counts[zone.index()]
    }

    pub fn increment(&mut self, zone: ZoneType) {
        self.counts[zone.index()] += 1;
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneType, u32)> + '_ {
        ZoneType::ALL.iter().map(move |z| (*z, self.get(*z)))
    }
}

/// How many more blocks of each non-residential zone the current residential
/// stock asks for. Mixed blocks count as residential.
fn deficits(counts: &ZoneCounts, params: &CityParams) -> [(ZoneType, f32); 5] {
    let residential = (counts.get(ZoneType::Residential) + counts.get(ZoneType::Mixed)) as f32;
    let want = |zone: ZoneType, ratio: f32| (zone, residential / ratio - counts.get(zone) as f32);
    [
        want(ZoneType::Commercial, params.residential_per_commercial),
        want(ZoneType::Industrial, params.residential_per_industrial),
        want(ZoneType::Office, params.residential_per_office),
        want(ZoneType::Agricultural, params.residential_per_agricultural),
        want(ZoneType::Park, params.residential_per_park),
    ]
}

fn random_zone<R: Rng + ?Sized>(rng: &mut R) -> ZoneType {
    ZoneType::GROWABLE[rng.gen_range(0..ZoneType::GROWABLE.len())]
}

/// Zone of the next block: usually whatever demand lacks most, otherwise
/// (and on some ties) something random.
pub fn choose_zone<R: Rng + ?Sized>(
    counts: &ZoneCounts,
    params: &CityParams,
    rng: &mut R,
) -> Result<ZoneType> {
    if !rng.gen_bool(params.demand_roll_chance) {
        return Ok(random_zone(rng));
    }

    let deficits = deficits(counts, params);
    let best = deficits.iter().map(|(_, d)| *d).fold(f32::MIN, f32::max);
    if best <= 0.0 {
        return Ok(ZoneType::Residential);
    }

    let tied: Vec<ZoneType> = deficits
        .iter()
        .filter(|(_, d)| best - *d < 1e-4)
        .map(|(z, _)| *z)
        .collect();
    if tied.len() == 1 {
        return Ok(tied[0]);
    }

    let [pick, mixed, any] = params.tie_break_weights;
    let tie_break = WeightedTable::new(&[(0u8, pick), (1, mixed), (2, any)])?;
    Ok(match tie_break.sample(rng) {
        0 => tied[rng.gen_range(0..tied.len())],
        1 => ZoneType::Mixed,
        _ => random_zone(rng),
    })
}
