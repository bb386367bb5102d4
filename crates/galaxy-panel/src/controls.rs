//! The control table: which parameter fields exist and the range each may take.

use galaxy_generator::Rgb;
use serde::{Deserialize, Serialize};

/// One editable field of the parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    ParticleCount,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    RandomnessPower,
    InnerColor,
    OuterColor,
}

impl ParamField {
    /// Every field, in panel order.
    pub const ALL: [ParamField; 9] = [
        ParamField::ParticleCount,
        ParamField::Size,
        ParamField::Radius,
        ParamField::Branches,
        ParamField::Spin,
        ParamField::Randomness,
        ParamField::RandomnessPower,
        ParamField::InnerColor,
        ParamField::OuterColor,
    ];

    /// The slider fields, selectable with the digit keys 1 to 7.
    pub const NUMERIC: [ParamField; 7] = [
        ParamField::ParticleCount,
        ParamField::Size,
        ParamField::Radius,
        ParamField::Branches,
        ParamField::Spin,
        ParamField::Randomness,
        ParamField::RandomnessPower,
    ];

    /// Name used in the JSON API and config files.
    pub fn name(self) -> &'static str {
        match self {
            ParamField::ParticleCount => "particle_count",
            ParamField::Size => "size",
            ParamField::Radius => "radius",
            ParamField::Branches => "branches",
            ParamField::Spin => "spin",
            ParamField::Randomness => "randomness",
            ParamField::RandomnessPower => "randomness_power",
            ParamField::InnerColor => "inner_color",
            ParamField::OuterColor => "outer_color",
        }
    }

    /// The widget bound to this field.
    pub fn control(self) -> Control {
        let slider = |min, max, step| Control::Slider(Slider { min, max, step });
        match self {
            ParamField::ParticleCount => slider(100.0, 1_000_000.0, 100.0),
            ParamField::Size => slider(0.001, 0.1, 0.001),
            ParamField::Radius => slider(0.01, 20.0, 0.01),
            ParamField::Branches => slider(2.0, 20.0, 1.0),
            ParamField::Spin => slider(-5.0, 5.0, 0.001),
            ParamField::Randomness => slider(0.0, 2.0, 0.001),
            ParamField::RandomnessPower => slider(1.0, 10.0, 0.001),
            ParamField::InnerColor | ParamField::OuterColor => Control::Color,
        }
    }

    /// Whether the field holds a whole number.
    pub fn is_integer(self) -> bool {
        matches!(self, ParamField::ParticleCount | ParamField::Branches)
    }
}

impl std::fmt::Display for ParamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Slider(Slider),
    /// Color swatch taking `#rrggbb`.
    Color,
}

/// A bounded numeric input with a fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Slider {
    /// Clamps `value` into range and snaps it to the nearest step.
    /// Non-finite input lands on `min`.
    pub fn quantize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        // Round to the step's decimal places so 0.2 + 0.001 reads 0.201.
        let decimals = (-self.step.log10()).round().max(0.0) as i32;
        let factor = 10f64.powi(decimals);
        ((snapped * factor).round() / factor).clamp(self.min, self.max)
    }

    /// Moves `value` by `steps` increments, staying in range.
    pub fn nudge(&self, value: f64, steps: i32) -> f64 {
        self.quantize(value + f64::from(steps) * self.step)
    }
}

/// A field value as exchanged with the panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Color(Rgb),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Color(c) => write!(f, "{c}"),
        }
    }
}

/// One row of the control table, as reported by `GET /params`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlRow {
    pub field: ParamField,
    pub value: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}
