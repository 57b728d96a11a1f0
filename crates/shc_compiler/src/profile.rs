//! Target profiles (`vs_6_7`, `lib_6_3`, ...) accepted by `-T`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Only shader model 6 is supported.
const SHADER_MODEL_MAJOR: u8 = 6;

/// Highest supported shader model 6 minor version.
const MAX_MINOR: u8 = 7;

/// The pipeline stage a shader is compiled for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShaderStage {
    /// Pixel shader (`ps`).
    Pixel,
    /// Vertex shader (`vs`).
    Vertex,
    /// Geometry shader (`gs`).
    Geometry,
    /// Hull shader (`hs`).
    Hull,
    /// Domain shader (`ds`).
    Domain,
    /// Compute shader (`cs`).
    Compute,
    /// Shader library (`lib`).
    Library,
    /// Mesh shader (`ms`).
    Mesh,
    /// Amplification shader (`as`).
    Amplification,
}

impl ShaderStage {
    /// Every stage.
    pub const ALL: [ShaderStage; 9] = [
        ShaderStage::Pixel,
        ShaderStage::Vertex,
        ShaderStage::Geometry,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Compute,
        ShaderStage::Library,
        ShaderStage::Mesh,
        ShaderStage::Amplification,
    ];

    /// The profile prefix, e.g. `ps`.
    pub fn prefix(self) -> &'static str {
        match self {
            ShaderStage::Pixel => "ps",
            ShaderStage::Vertex => "vs",
            ShaderStage::Geometry => "gs",
            ShaderStage::Hull => "hs",
            ShaderStage::Domain => "ds",
            ShaderStage::Compute => "cs",
            ShaderStage::Library => "lib",
            ShaderStage::Mesh => "ms",
            ShaderStage::Amplification => "as",
        }
    }

    /// The first shader model 6 minor version that has this stage.
    pub fn min_minor(self) -> u8 {
        match self {
            ShaderStage::Library => 1,
            ShaderStage::Mesh | ShaderStage::Amplification => 5,
            _ => 0,
        }
    }
}

/// A stage and shader model pair such as `ps_6_0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TargetProfile {
    stage: ShaderStage,
    minor: u8,
}

impl TargetProfile {
    /// Creates a profile for shader model `6.<minor>`, if the stage exists there.
    pub fn new(stage: ShaderStage, minor: u8) -> Option<Self> {
        (stage.min_minor()..=MAX_MINOR)
            .contains(&minor)
            .then_some(Self { stage, minor })
    }

    /// The pipeline stage.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The shader model as `(major, minor)`.
    pub fn shader_model(&self) -> (u8, u8) {
        (SHADER_MODEL_MAJOR, self.minor)
    }

    /// Every supported profile, grouped by stage.
    pub fn all() -> impl Iterator<Item = TargetProfile> {
        ShaderStage::ALL.into_iter().flat_map(|stage| {
            (stage.min_minor()..=MAX_MINOR).map(move |minor| TargetProfile { stage, minor })
        })
    }
}

impl fmt::Display for TargetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.stage.prefix(),
            SHADER_MODEL_MAJOR,
            self.minor
        )
    }
}

/// Returned when a string is not a supported target profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported target profile `{0}`")]
pub struct UnknownProfile(pub String);

impl FromStr for TargetProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownProfile(s.to_string());
        let lower = s.to_ascii_lowercase();
        let mut parts = lower.splitn(3, '_');
        let (Some(prefix), Some(major), Some(minor)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(unknown());
        };
        let stage = ShaderStage::ALL
            .into_iter()
            .find(|stage| stage.prefix() == prefix)
            .ok_or_else(unknown)?;
        if major != "6" {
            return Err(unknown());
        }
        let minor = match minor.as_bytes() {
            [digit @ b'0'..=b'9'] => digit - b'0',
            _ => return Err(unknown()),
        };
        TargetProfile::new(stage, minor).ok_or_else(unknown)
    }
}

impl Serialize for TargetProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
