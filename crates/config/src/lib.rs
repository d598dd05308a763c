// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default schema version for YAML run files
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_data_size() -> DataSize {
    DataSize::Bytes(DEFAULT_DATA_SIZE)
}

fn default_contexts() -> u32 {
    1
}

/// Total arena bytes per instance when nothing else is requested (2K run).
pub const DEFAULT_DATA_SIZE: u64 = 2000;

/// Two instances at most, one per execution unit.
pub const MAX_CONTEXTS: u32 = 2;

bitflags::bitflags! {
    /// Set of kernels enabled for a run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Algorithms: u32 {
        const LIST = 1 << 0;
        const MATRIX = 1 << 1;
        const STATE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    List,
    Matrix,
    State,
}

impl Algorithm {
    /// Region order inside the arena.
    pub const ALL: [Algorithm; 3] = [Algorithm::List, Algorithm::Matrix, Algorithm::State];

    pub fn flag(self) -> Algorithms {
        match self {
            Algorithm::List => Algorithms::LIST,
            Algorithm::Matrix => Algorithms::MATRIX,
            Algorithm::State => Algorithms::STATE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::List => "list",
            Algorithm::Matrix => "matrix",
            Algorithm::State => "state",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "matrix" => Ok(Self::Matrix),
            "state" => Ok(Self::State),
            _ => Err(format!(
                "unsupported algorithm '{}'; supported: list, matrix, state",
                value
            )),
        }
    }
}

impl Algorithms {
    /// Enabled algorithms in region order.
    pub fn members(self) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| self.contains(a.flag()))
            .collect()
    }
}

/// Resolved seed triple. Every generator output is a function of these and
/// the per-algorithm size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Seeds {
    pub seed1: i16,
    pub seed2: i16,
    pub seed3: i16,
}

impl Seeds {
    pub const PERFORMANCE: Seeds = Seeds {
        seed1: 0,
        seed2: 0,
        seed3: 0x66,
    };
    pub const VALIDATION: Seeds = Seeds {
        seed1: 0x3415,
        seed2: 0x3415,
        seed3: 0x66,
    };
    pub const PROFILE: Seeds = Seeds {
        seed1: 8,
        seed2: 8,
        seed3: 8,
    };

    pub const fn new(seed1: i16, seed2: i16, seed3: i16) -> Self {
        Self {
            seed1,
            seed2,
            seed3,
        }
    }

    /// Shorthand triples: `0,0,0` selects the performance run and `1,0,0`
    /// the validation run.
    pub fn expand_shorthand(self) -> Self {
        match (self.seed1, self.seed2, self.seed3) {
            (0, 0, 0) => Self::PERFORMANCE,
            (1, 0, 0) => Self::VALIDATION,
            _ => self,
        }
    }
}

/// Seeds as written in a run file. Values are 32-bit and truncate to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    #[serde(default)]
    pub seed1: i32,
    #[serde(default)]
    pub seed2: i32,
    #[serde(default)]
    pub seed3: i32,
}

impl SeedConfig {
    pub fn resolve(&self) -> Seeds {
        Seeds::new(self.seed1 as i16, self.seed2 as i16, self.seed3 as i16).expand_shorthand()
    }
}

/// Arena size, either a plain byte count or a human-readable size ("6 kB").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSize {
    Bytes(u64),
    Text(String),
}

impl DataSize {
    pub fn bytes(&self) -> Result<u64> {
        match self {
            DataSize::Bytes(n) => Ok(*n),
            DataSize::Text(s) => parse_size(s),
        }
    }
}

/// Wall-clock policy of the iteration controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Length of one time unit. Calibration probes until a run lasts one unit.
    #[serde(default = "TimingConfig::default_unit_ms")]
    pub unit_ms: u64,
    /// Units the measurement run is scaled towards.
    #[serde(default = "TimingConfig::default_target_units")]
    pub target_units: u64,
    /// Shorter measurement runs are reported as insufficient.
    #[serde(default = "TimingConfig::default_min_valid_ms")]
    pub min_valid_ms: u64,
}

impl TimingConfig {
    fn default_unit_ms() -> u64 {
        1000
    }

    fn default_target_units() -> u64 {
        10
    }

    fn default_min_valid_ms() -> u64 {
        10_000
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unit_ms: Self::default_unit_ms(),
            target_units: Self::default_target_units(),
            min_valid_ms: Self::default_min_valid_ms(),
        }
    }
}

/// Canonical run shapes with published reference checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Performance,
    Validation,
    Profile,
}

impl Preset {
    pub fn seeds(self) -> Seeds {
        match self {
            Preset::Performance => Seeds::PERFORMANCE,
            Preset::Validation => Seeds::VALIDATION,
            Preset::Profile => Seeds::PROFILE,
        }
    }

    /// Total arena bytes for all three algorithms.
    pub fn data_size(self) -> u64 {
        match self {
            Preset::Performance | Preset::Validation => 6000,
            Preset::Profile => 1200,
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "performance" | "perf" => Ok(Self::Performance),
            "validation" | "valid" => Ok(Self::Validation),
            "profile" => Ok(Self::Profile),
            _ => Err(format!(
                "unsupported preset '{}'; supported: performance, validation, profile",
                value
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub seeds: SeedConfig,
    /// Zero selects auto-calibration.
    #[serde(default)]
    pub iterations: u32,
    /// Empty selects every algorithm.
    #[serde(default)]
    pub algorithms: Vec<Algorithm>,
    #[serde(default = "default_data_size")]
    pub data_size: DataSize,
    #[serde(default = "default_contexts")]
    pub contexts: u32,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            seeds: SeedConfig::default(),
            iterations: 0,
            algorithms: Vec::new(),
            data_size: default_data_size(),
            contexts: default_contexts(),
            timing: TimingConfig::default(),
        }
    }
}

/// Fully resolved run parameters handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub seeds: Seeds,
    pub iterations: u32,
    pub algorithms: Algorithms,
    pub data_size: usize,
    pub contexts: usize,
    pub timing: TimingConfig,
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read run config at {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(contents).context("Failed to parse Run Config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        let seeds = preset.seeds();
        self.seeds = SeedConfig {
            seed1: seeds.seed1.into(),
            seed2: seeds.seed2.into(),
            seed3: seeds.seed3.into(),
        };
        self.data_size = DataSize::Bytes(preset.data_size());
    }

    pub fn algorithms(&self) -> Algorithms {
        if self.algorithms.is_empty() {
            return Algorithms::all();
        }
        self.algorithms
            .iter()
            .fold(Algorithms::empty(), |acc, a| acc | a.flag())
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        let bytes = self.data_size.bytes()?;
        if bytes == 0 {
            anyhow::bail!("'data_size' must be greater than zero");
        }
        if usize::try_from(bytes).is_err() {
            anyhow::bail!("'data_size' of {} bytes does not fit this host", bytes);
        }

        if self.contexts == 0 || self.contexts > MAX_CONTEXTS {
            anyhow::bail!(
                "'contexts' must be between 1 and {}, got {}",
                MAX_CONTEXTS,
                self.contexts
            );
        }

        if self.timing.unit_ms == 0 {
            anyhow::bail!("Timing 'unit_ms' must be greater than zero");
        }

        Ok(())
    }

    pub fn resolve(&self) -> Result<RunParams> {
        self.validate()?;
        let data_size = usize::try_from(self.data_size.bytes()?)
            .context("'data_size' does not fit this host")?;
        let params = RunParams {
            seeds: self.seeds.resolve(),
            iterations: self.iterations,
            algorithms: self.algorithms(),
            data_size,
            contexts: self.contexts as usize,
            timing: self.timing,
        };
        tracing::debug!(?params, "resolved run configuration");
        Ok(params)
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let trimmed = size_str.trim();
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(n);
    }
    let s: Size = trimmed
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format '{}': {}", size_str, e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}

/// Parses a seed given in decimal or `0x` hexadecimal.
pub fn parse_seed(s: &str) -> Result<i32, String> {
    let trimmed = s.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex seed '{}': {}", s, e))?
    } else {
        digits
            .parse::<i64>()
            .map_err(|e| format!("Invalid seed '{}': {}", s, e))?
    };
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).map_err(|_| format!("Seed '{}' does not fit in 32 bits", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RunConfig::default());

        let params = config.resolve().unwrap();
        assert_eq!(params.seeds, Seeds::PERFORMANCE);
        assert_eq!(params.iterations, 0);
        assert_eq!(params.algorithms, Algorithms::all());
        assert_eq!(params.data_size, 2000);
        assert_eq!(params.contexts, 1);
        assert_eq!(params.timing, TimingConfig::default());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
schema_version: "1.0"
seeds:
  seed1: 0x3415
  seed2: 0x3415
  seed3: 0x66
iterations: 250
algorithms: [list, state]
data_size: 4000
contexts: 2
timing:
  unit_ms: 50
  target_units: 4
  min_valid_ms: 0
"#;
        let params = RunConfig::from_yaml(yaml).unwrap().resolve().unwrap();
        assert_eq!(params.seeds, Seeds::VALIDATION);
        assert_eq!(params.iterations, 250);
        assert_eq!(params.algorithms, Algorithms::LIST | Algorithms::STATE);
        assert_eq!(params.data_size, 4000);
        assert_eq!(params.contexts, 2);
        assert_eq!(
            params.timing,
            TimingConfig {
                unit_ms: 50,
                target_units: 4,
                min_valid_ms: 0
            }
        );
    }

    #[test]
    fn test_seed_shorthands() {
        let validation = SeedConfig {
            seed1: 1,
            seed2: 0,
            seed3: 0,
        };
        assert_eq!(validation.resolve(), Seeds::VALIDATION);

        let custom = SeedConfig {
            seed1: 1,
            seed2: 0,
            seed3: 7,
        };
        assert_eq!(custom.resolve(), Seeds::new(1, 0, 7));
    }

    #[test]
    fn test_seeds_truncate_to_16_bits() {
        let seeds = SeedConfig {
            seed1: 0x1_3415,
            seed2: -1,
            seed3: 0xffff,
        };
        assert_eq!(seeds.resolve(), Seeds::new(0x3415, -1, -1));
    }

    #[test]
    fn test_human_readable_data_size() {
        let config = RunConfig::from_yaml("data_size: \"6 kB\"").unwrap();
        assert_eq!(config.resolve().unwrap().data_size, 6000);

        let config = RunConfig::from_yaml("data_size: \"1200\"").unwrap();
        assert_eq!(config.resolve().unwrap().data_size, 1200);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(RunConfig::from_yaml("schema_version: \"2.0\"").is_err());
        assert!(RunConfig::from_yaml("data_size: 0").is_err());
        assert!(RunConfig::from_yaml("contexts: 3").is_err());
        assert!(RunConfig::from_yaml("contexts: 0").is_err());
        assert!(RunConfig::from_yaml("timing: { unit_ms: 0 }").is_err());
        assert!(RunConfig::from_yaml("algorithms: [fft]").is_err());
        assert!(RunConfig::from_yaml("unknown_field: 1").is_err());
    }

    #[test]
    fn test_presets() {
        let mut config = RunConfig::default();
        config.apply_preset(Preset::Profile);
        let params = config.resolve().unwrap();
        assert_eq!(params.seeds, Seeds::PROFILE);
        assert_eq!(params.data_size, 1200);

        assert_eq!("perf".parse::<Preset>(), Ok(Preset::Performance));
        assert!("warmup".parse::<Preset>().is_err());
    }

    #[test]
    fn test_algorithm_members_keep_region_order() {
        let set = Algorithms::STATE | Algorithms::LIST;
        assert_eq!(set.members(), vec![Algorithm::List, Algorithm::State]);
        assert_eq!(" Matrix ".parse::<Algorithm>(), Ok(Algorithm::Matrix));
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("0x3415"), Ok(0x3415));
        assert_eq!(parse_seed("102"), Ok(102));
        assert_eq!(parse_seed("-0x10"), Ok(-16));
        assert!(parse_seed("0xzz").is_err());
        assert_eq!(parse_seed("0x7fffffff"), Ok(i32::MAX));
        assert_eq!(parse_seed("-0x80000000"), Ok(i32::MIN));
        assert!(parse_seed("0x100000000").is_err());
        assert!(parse_seed("0x80000000").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join("picomark-config-from-file");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.yaml");
        std::fs::write(&path, "iterations: 10\nalgorithms: [list]\n").unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.iterations, 10);
        assert_eq!(config.algorithms(), Algorithms::LIST);

        assert!(RunConfig::from_file(dir.join("missing.yaml")).is_err());
    }
}
