//! Random board generator used to seed the catalog

use crate::config::FixtureConfig;
use crate::error::{AppError, Result};
use crate::models::{Board, Feature, Spec, Stance};
use rand::Rng;
use uuid::Uuid;

const ANIMALS: &[&str] = &[
    "Albatross", "Badger", "Barracuda", "Bison", "Caracal", "Cheetah", "Condor", "Coyote",
    "Dingo", "Falcon", "Ferret", "Gecko", "Heron", "Ibex", "Jackal", "Jaguar", "Kestrel",
    "Lemur", "Lynx", "Marmot", "Marten", "Mink", "Narwhal", "Ocelot", "Orca", "Osprey",
    "Otter", "Panther", "Pelican", "Puma", "Raven", "Sable", "Stoat", "Tapir", "Viper",
    "Walrus", "Wolverine", "Yak", "Zebra",
];

const QUOTES: &[&str] = &[
    "Wisely and slow; they stumble that run fast.",
    "Parting is such sweet sorrow.",
    "Did my heart love till now? Forswear it, sight!",
    "These violent delights have violent ends.",
    "My bounty is as boundless as the sea, my love as deep.",
    "O teach me how I should forget to think.",
    "Love goes toward love as schoolboys from their books.",
    "Thus with a kiss I die.",
    "What's in a name? That which we call a rose by any other word would smell as sweet.",
    "Come, gentle night; come, loving, black-brow'd night.",
];

const FEATURE_TYPES: &[&str] = &["Base", "Core", "Edge", "Sidewall", "Topsheet", "Inserts", "Laminate"];

const FEATURE_NAMES: &[&str] = &[
    "Sintered Base", "Extruded Base", "Poplar Core", "Bamboo Stringers", "Carbon Laces",
    "Magne-Traction", "Serrated Edge", "ABS Sidewall", "Urethane Sidewall", "Triax Glass",
    "Biax Glass", "4x2 Inserts", "Channel Mount",
];

const FEATURE_DESCRIPTIONS: &[&str] = &[
    "Holds wax longer and stays fast in wet snow.",
    "Light and lively with a snappy pop.",
    "Grips hard on ice and groomed corduroy.",
    "Soaks up chatter through rough landings.",
    "Adds torsional stiffness for precise carving.",
    "Forgiving flex for presses and butters.",
    "Floats the nose in deep powder.",
];

/// Builds random but plausible boards from the configured value pools
#[derive(Debug, Clone)]
pub struct BoardGenerator {
    sizes: Vec<(String, i32)>,
    riding_levels: Vec<String>,
    bends: Vec<String>,
    shapes: Vec<String>,
    terrains: Vec<String>,
    stance_min: Vec<f64>,
    stance_max: Vec<f64>,
    stance_set_back: Vec<f64>,
}

impl BoardGenerator {
    /// Validate the pools up front so generation itself cannot fail
    pub fn new(config: &FixtureConfig) -> Result<Self> {
        let sizes = non_empty("sizes", &config.sizes)?
            .iter()
            .map(|size| Ok((size.clone(), board_length(size)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sizes,
            riding_levels: non_empty("riding_levels", &config.riding_levels)?.to_vec(),
            bends: non_empty("bends", &config.bends)?.to_vec(),
            shapes: non_empty("shapes", &config.shapes)?.to_vec(),
            terrains: non_empty("terrains", &config.terrains)?.to_vec(),
            stance_min: parse_floats("stance_min", &config.stance_min)?,
            stance_max: parse_floats("stance_max", &config.stance_max)?,
            stance_set_back: parse_floats("stance_set_back", &config.stance_set_back)?,
        })
    }

    pub fn generate(&self) -> Board {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_many(&self, count: usize) -> Vec<Board> {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| self.generate_with(&mut rng)).collect()
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let (size, length) = pick(rng, &self.sizes).clone();
        let feature_count = rng.gen_range(0..4);

        Board {
            id: Some(Uuid::new_v4().to_string()),
            year: rng.gen_range(2010..=2020),
            name: pick(rng, ANIMALS).to_string(),
            code: imei(rng),
            spec: self.spec(rng, length),
            size,
            features: (0..feature_count).map(|_| feature(rng)).collect(),
            terrain: pick(rng, &self.terrains).clone(),
            riding_level: pick(rng, &self.riding_levels).clone(),
            bend: pick(rng, &self.bends).clone(),
            shape: pick(rng, &self.shapes).clone(),
            details: pick(rng, QUOTES).to_string(),
        }
    }

    fn spec<R: Rng + ?Sized>(&self, rng: &mut R, length: i32) -> Spec {
        let nose_width = one_decimal(f64::from(length) / 5.13);

        Spec {
            contact_length: length - 40,
            side_cut: one_decimal(rng.gen_range(7.0..9.0)),
            waist_width: one_decimal(rng.gen_range(17.0..24.5)),
            nose_width,
            tail_width: one_decimal(nose_width / 1.0555),
            weight_range: length - rng.gen_range(70..=84),
            flex: rng.gen_range(1..=10),
            stance: Stance {
                min: *pick(rng, &self.stance_min),
                max: *pick(rng, &self.stance_max),
                set_back: *pick(rng, &self.stance_set_back),
            },
        }
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, pool: &'a [T]) -> &'a T {
    // pools are checked non-empty in BoardGenerator::new
    &pool[rng.gen_range(0..pool.len())]
}

fn feature<R: Rng + ?Sized>(rng: &mut R) -> Feature {
    Feature {
        feature_type: pick(rng, FEATURE_TYPES).to_string(),
        name: pick(rng, FEATURE_NAMES).to_string(),
        description: pick(rng, FEATURE_DESCRIPTIONS).to_string(),
    }
}

/// 15 digits, the last one a Luhn check digit
fn imei<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits: Vec<u32> = (0..14).map(|_| rng.gen_range(0..10)).collect();
    digits.push(luhn_check_digit(&digits));
    digits
        .into_iter()
        .filter_map(|d| char::from_digit(d, 10))
        .collect()
}

fn luhn_check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

/// Truncate to one decimal place
fn one_decimal(value: f64) -> f64 {
    (value * 10.0).floor() / 10.0
}

/// Board length in cm from a size such as `158W`
fn board_length(size: &str) -> Result<i32> {
    size.get(..3)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "fixture size '{}' must start with a three digit length",
                size
            ))
        })
}

fn non_empty<'a>(name: &str, pool: &'a [String]) -> Result<&'a [String]> {
    if pool.is_empty() {
        return Err(AppError::Configuration(format!("fixture pool '{}' is empty", name)));
    }
    Ok(pool)
}

fn parse_floats(name: &str, pool: &[String]) -> Result<Vec<f64>> {
    non_empty(name, pool)?
        .iter()
        .map(|raw| {
            raw.trim().parse::<f64>().map_err(|e| {
                AppError::Configuration(format!("fixture pool '{}' value '{}': {}", name, raw, e))
            })
        })
        .collect()
}
