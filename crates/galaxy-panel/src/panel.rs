//! The live parameter set and its edit/commit cycle.
//!
//! Edits are intermediate: they change the stored values immediately but do
//! not ask for a new galaxy. A commit marks the edit as finished. The
//! application drains commits once per frame and regenerates at most once per
//! drain, however many commits piled up in between.

use galaxy_generator::{GalaxyParameters, Rgb};
use serde::Deserialize;

use crate::controls::{Control, ControlRow, ParamField, ParamValue};

/// Rejected panel edits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("{field} expects a {expected}")]
    WrongKind {
        field: ParamField,
        expected: &'static str,
    },
}

/// A partial update, as accepted by `POST /params`. Absent fields are left
/// alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterPatch {
    pub particle_count: Option<f64>,
    pub size: Option<f64>,
    pub radius: Option<f64>,
    pub branches: Option<f64>,
    pub spin: Option<f64>,
    pub randomness: Option<f64>,
    pub randomness_power: Option<f64>,
    pub inner_color: Option<Rgb>,
    pub outer_color: Option<Rgb>,
}

impl ParameterPatch {
    fn entries(&self) -> Vec<(ParamField, ParamValue)> {
        let numbers = [
            (ParamField::ParticleCount, self.particle_count),
            (ParamField::Size, self.size),
            (ParamField::Radius, self.radius),
            (ParamField::Branches, self.branches),
            (ParamField::Spin, self.spin),
            (ParamField::Randomness, self.randomness),
            (ParamField::RandomnessPower, self.randomness_power),
        ];
        let colors = [
            (ParamField::InnerColor, self.inner_color),
            (ParamField::OuterColor, self.outer_color),
        ];

        numbers
            .into_iter()
            .filter_map(|(field, v)| v.map(|v| (field, ParamValue::Number(v))))
            .chain(
                colors
                    .into_iter()
                    .filter_map(|(field, c)| c.map(|c| (field, ParamValue::Color(c)))),
            )
            .collect()
    }
}

/// Holds the parameter set the next galaxy will be built from.
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    params: GalaxyParameters,
    pending_commit: bool,
    commits: u64,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new(GalaxyParameters::default())
    }
}

impl ParameterPanel {
    /// Creates a panel holding `initial`, with every field pulled into its
    /// control range.
    pub fn new(initial: GalaxyParameters) -> Self {
        let mut panel = Self {
            params: initial,
            pending_commit: false,
            commits: 0,
        };
        for field in ParamField::NUMERIC {
            let value = panel.number(field);
            panel.write_number(field, value);
        }
        panel
    }

    pub fn params(&self) -> &GalaxyParameters {
        &self.params
    }

    /// Current value of `field`.
    pub fn get(&self, field: ParamField) -> ParamValue {
        match field {
            ParamField::InnerColor => ParamValue::Color(self.params.inner_color),
            ParamField::OuterColor => ParamValue::Color(self.params.outer_color),
            numeric => ParamValue::Number(self.display_number(numeric)),
        }
    }

    /// Intermediate edit. Numbers are clamped and snapped to the field's
    /// step; the stored value is returned.
    pub fn set(&mut self, field: ParamField, value: ParamValue) -> Result<ParamValue, PanelError> {
        match (field.control(), value) {
            (Control::Slider(_), ParamValue::Number(n)) => {
                self.write_number(field, n);
                Ok(self.get(field))
            }
            (Control::Color, ParamValue::Color(c)) => {
                match field {
                    ParamField::InnerColor => self.params.inner_color = c,
                    _ => self.params.outer_color = c,
                }
                Ok(value)
            }
            (Control::Slider(_), _) => Err(PanelError::WrongKind {
                field,
                expected: "number",
            }),
            (Control::Color, _) => Err(PanelError::WrongKind {
                field,
                expected: "#rrggbb color",
            }),
        }
    }

    /// Moves a slider by `steps` increments. Color fields are left alone.
    pub fn nudge(&mut self, field: ParamField, steps: i32) -> Option<f64> {
        let Control::Slider(slider) = field.control() else {
            return None;
        };
        let next = slider.nudge(self.number(field), steps);
        self.write_number(field, next);
        Some(self.display_number(field))
    }

    /// Applies every field in `patch`. Returns the fields touched.
    pub fn apply_patch(&mut self, patch: &ParameterPatch) -> Result<Vec<ParamField>, PanelError> {
        patch
            .entries()
            .into_iter()
            .map(|(field, value)| self.set(field, value).map(|_| field))
            .collect()
    }

    /// Marks the current values as final.
    pub fn commit(&mut self) {
        self.pending_commit = true;
        self.commits += 1;
    }

    /// Returns `true` once per batch of commits.
    pub fn take_commit(&mut self) -> bool {
        std::mem::take(&mut self.pending_commit)
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending_commit
    }

    /// Total commits over the panel's lifetime.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// One row per field with its value and bounds.
    pub fn table(&self) -> Vec<ControlRow> {
        ParamField::ALL
            .into_iter()
            .map(|field| {
                let (min, max, step) = match field.control() {
                    Control::Slider(s) => (Some(s.min), Some(s.max), Some(s.step)),
                    Control::Color => (None, None, None),
                };
                ControlRow {
                    field,
                    value: self.get(field),
                    min,
                    max,
                    step,
                }
            })
            .collect()
    }

    /// The table as aligned text, one field per line.
    pub fn format_table(&self) -> String {
        self.table()
            .iter()
            .map(|row| match (row.min, row.max) {
                (Some(min), Some(max)) => {
                    format!("{:<17} {:>10}  [{min} .. {max}]", row.field.name(), row.value)
                }
                _ => format!("{:<17} {:>10}", row.field.name(), row.value),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn number(&self, field: ParamField) -> f64 {
        let p = &self.params;
        match field {
            ParamField::ParticleCount => f64::from(p.particle_count),
            ParamField::Size => f64::from(p.size),
            ParamField::Radius => f64::from(p.radius),
            ParamField::Branches => f64::from(p.branches),
            ParamField::Spin => f64::from(p.spin),
            ParamField::Randomness => f64::from(p.randomness),
            ParamField::RandomnessPower => f64::from(p.randomness_power),
            ParamField::InnerColor | ParamField::OuterColor => 0.0,
        }
    }

    /// The stored value widened back to f64 and re-snapped, so an `f32`
    /// such as 0.01 reads as `0.01` rather than `0.009999999776482582`.
    fn display_number(&self, field: ParamField) -> f64 {
        match field.control() {
            Control::Slider(slider) => slider.quantize(self.number(field)),
            Control::Color => 0.0,
        }
    }

    fn write_number(&mut self, field: ParamField, value: f64) {
        let Control::Slider(slider) = field.control() else {
            return;
        };
        let v = slider.quantize(value);
        let p = &mut self.params;
        match field {
            ParamField::ParticleCount => p.particle_count = v as u32,
            ParamField::Size => p.size = v as f32,
            ParamField::Radius => p.radius = v as f32,
            ParamField::Branches => p.branches = v as u32,
            ParamField::Spin => p.spin = v as f32,
            ParamField::Randomness => p.randomness = v as f32,
            ParamField::RandomnessPower => p.randomness_power = v as f32,
            ParamField::InnerColor | ParamField::OuterColor => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(panel: &ParameterPanel, field: ParamField) -> f64 {
        match panel.get(field) {
            ParamValue::Number(n) => n,
            ParamValue::Color(_) => panic!("{field} is a color"),
        }
    }

    #[test]
    fn test_defaults_survive_sanitizing() {
        let panel = ParameterPanel::default();
        assert_eq!(panel.params(), &GalaxyParameters::default());
        assert!(!panel.has_pending_commit());
    }

    #[test]
    fn test_initial_values_clamped() {
        let panel = ParameterPanel::new(GalaxyParameters {
            particle_count: 5,
            branches: 1,
            randomness_power: 0.5,
            ..Default::default()
        });
        assert_eq!(panel.params().particle_count, 100);
        assert_eq!(panel.params().branches, 2);
        assert_eq!(panel.params().randomness_power, 1.0);
    }

    #[test]
    fn test_set_clamps_and_snaps() {
        let mut panel = ParameterPanel::default();
        let applied = panel
            .set(ParamField::ParticleCount, ParamValue::Number(2_000_050.0))
            .unwrap();
        assert_eq!(applied, ParamValue::Number(1_000_000.0));
        assert_eq!(panel.params().particle_count, 1_000_000);

        panel.set(ParamField::Branches, ParamValue::Number(7.4)).unwrap();
        assert_eq!(panel.params().branches, 7);

        panel.set(ParamField::Size, ParamValue::Number(0.0)).unwrap();
        assert!((number(&panel, ParamField::Size) - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_set_does_not_commit() {
        let mut panel = ParameterPanel::default();
        panel.set(ParamField::Spin, ParamValue::Number(-2.0)).unwrap();
        assert!(!panel.take_commit());
        assert_eq!(panel.params().spin, -2.0);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut panel = ParameterPanel::default();
        let red = Rgb::from_hex("#ff0000").unwrap();
        assert!(matches!(
            panel.set(ParamField::Radius, ParamValue::Color(red)),
            Err(PanelError::WrongKind { .. })
        ));
        assert!(matches!(
            panel.set(ParamField::InnerColor, ParamValue::Number(1.0)),
            Err(PanelError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_set_color() {
        let mut panel = ParameterPanel::default();
        let white = Rgb::from_hex("#ffffff").unwrap();
        panel.set(ParamField::OuterColor, ParamValue::Color(white)).unwrap();
        assert_eq!(panel.params().outer_color, white);
        assert_eq!(panel.params().inner_color.to_hex(), "#ff6030");
    }

    #[test]
    fn test_commit_drains_once() {
        let mut panel = ParameterPanel::default();
        panel.commit();
        panel.commit();
        assert_eq!(panel.commit_count(), 2);
        assert!(panel.take_commit());
        assert!(!panel.take_commit());
    }

    #[test]
    fn test_nudge() {
        let mut panel = ParameterPanel::default();
        assert_eq!(panel.nudge(ParamField::Branches, 1), Some(4.0));
        assert_eq!(panel.nudge(ParamField::Branches, -10), Some(2.0));
        assert_eq!(panel.nudge(ParamField::ParticleCount, 10), Some(101_000.0));
        assert_eq!(panel.nudge(ParamField::InnerColor, 1), None);
    }

    #[test]
    fn test_apply_patch() {
        let mut panel = ParameterPanel::default();
        let patch: ParameterPatch =
            serde_json::from_str(r##"{"branches": 5, "spin": 9.5, "inner_color": "#00ff00"}"##)
                .unwrap();
        let mut touched = panel.apply_patch(&patch).unwrap();
        touched.sort_by_key(|f| f.name());
        assert_eq!(
            touched,
            vec![ParamField::Branches, ParamField::InnerColor, ParamField::Spin]
        );
        assert_eq!(panel.params().branches, 5);
        assert_eq!(panel.params().spin, 5.0);
        assert_eq!(panel.params().inner_color.to_hex(), "#00ff00");
        assert!(!panel.has_pending_commit());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<ParameterPatch, _> = serde_json::from_str(r#"{"arms": 4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_table_lists_every_field() {
        let panel = ParameterPanel::default();
        let table = panel.table();
        assert_eq!(table.len(), 9);
        assert_eq!(table[0].field, ParamField::ParticleCount);
        assert_eq!(table[0].min, Some(100.0));
        assert_eq!(table[8].min, None);

        let text = panel.format_table();
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("randomness_power"));
        assert!(text.contains("#1b3984"));
    }
}
