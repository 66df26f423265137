use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    /// Heat/cool changeover. The unit calls this "auto".
    Auto,
    Heat,
    Dry,
    Cool,
    FanOnly,
}

impl HvacMode {
    pub const ALL: [HvacMode; 6] = [
        HvacMode::Off,
        HvacMode::Auto,
        HvacMode::Heat,
        HvacMode::Dry,
        HvacMode::Cool,
        HvacMode::FanOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Auto => "auto",
            HvacMode::Heat => "heat",
            HvacMode::Dry => "dry",
            HvacMode::Cool => "cool",
            HvacMode::FanOnly => "fan_only",
        }
    }

    /// `(p, m)` pair for `/set.cgi`. Off still carries a valid mode bit.
    pub fn to_wire(&self) -> (u8, u8) {
        match self {
            HvacMode::Off => (0, 1),
            HvacMode::Auto => (1, 1),
            HvacMode::Heat => (1, 2),
            HvacMode::Dry => (1, 4),
            HvacMode::Cool => (1, 8),
            HvacMode::FanOnly => (1, 16),
        }
    }

    /// Decode `opmode`/`acmode`. Power off wins; unknown mode bits read as off.
    pub fn from_wire(opmode: i64, acmode: i64) -> Self {
        if opmode == 0 {
            return HvacMode::Off;
        }
        match acmode {
            1 => HvacMode::Auto,
            2 => HvacMode::Heat,
            4 => HvacMode::Dry,
            8 => HvacMode::Cool,
            16 => HvacMode::FanOnly,
            _ => HvacMode::Off,
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(HvacMode::Off),
            "auto" | "heat_cool" => Ok(HvacMode::Auto),
            "heat" => Ok(HvacMode::Heat),
            "dry" => Ok(HvacMode::Dry),
            "cool" => Ok(HvacMode::Cool),
            "fan_only" | "fan" => Ok(HvacMode::FanOnly),
            other => Err(CommandError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    Low,
    Medium,
    High,
}

impl FanMode {
    pub const ALL: [FanMode; 3] = [FanMode::Low, FanMode::Medium, FanMode::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            FanMode::Low => "low",
            FanMode::Medium => "medium",
            FanMode::High => "high",
        }
    }

    /// 1-based `f` / `fanspeed` index.
    pub fn to_wire(&self) -> u8 {
        match self {
            FanMode::Low => 1,
            FanMode::Medium => 2,
            FanMode::High => 3,
        }
    }

    pub fn from_wire(index: i64) -> Option<Self> {
        match index {
            1 => Some(FanMode::Low),
            2 => Some(FanMode::Medium),
            3 => Some(FanMode::High),
            _ => None,
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanMode {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(FanMode::Low),
            "medium" => Ok(FanMode::Medium),
            "high" => Ok(FanMode::High),
            _ => Err(CommandError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemperatureUnit(&'static str);

impl TemperatureUnit {
    pub const CELSIUS: TemperatureUnit = TemperatureUnit("°C");

    pub fn symbol(&self) -> &'static str {
        self.0
    }
}

/// Feature bits, numbered the way climate hosts number them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SupportedFeatures(u8);

impl SupportedFeatures {
    pub const NONE: SupportedFeatures = SupportedFeatures(0);
    pub const TARGET_TEMPERATURE: SupportedFeatures = SupportedFeatures(1);
    pub const TARGET_TEMPERATURE_RANGE: SupportedFeatures = SupportedFeatures(2);
    pub const FAN_MODE: SupportedFeatures = SupportedFeatures(8);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: SupportedFeatures) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SupportedFeatures {
    type Output = SupportedFeatures;

    fn bitor(self, rhs: Self) -> Self::Output {
        SupportedFeatures(self.0 | rhs.0)
    }
}

/// Last known state of the unit.
///
/// `target_temperature_low`/`high` exist for hosts that expect range
/// setpoints; the unit has no range mode so they stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    pub current_temperature: f64,
    pub target_temperature: Option<f64>,
    pub target_temperature_low: Option<f64>,
    pub target_temperature_high: Option<f64>,
    pub outside_temperature: f64,
    pub hvac_mode: HvacMode,
    pub fan_mode: FanMode,
    pub supported_features: SupportedFeatures,
}

/// Events emitted when a refresh or command changes a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CurrentTemperatureChanged { temp: f64 },
    TargetTemperatureChanged { temp: Option<f64> },
    OutsideTemperatureChanged { temp: f64 },
    HvacModeChanged { mode: HvacMode },
    FanModeChanged { mode: FanMode },
}
