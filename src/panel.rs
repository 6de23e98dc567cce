//! Debug panel model: what controls exist and the events they emit. The DOM
//! side only renders these descriptors and forwards events.

use crate::config::SliderRange;
use crate::material::Axis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub name: &'static str,
    pub axis: Axis,
    pub range: SliderRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    StartCapture,
    StopCapture,
}

impl PanelAction {
    pub const ALL: [PanelAction; 2] = [PanelAction::StartCapture, PanelAction::StopCapture];

    pub fn label(self) -> &'static str {
        match self {
            PanelAction::StartCapture => "Start Capture",
            PanelAction::StopCapture => "Stop Capture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    Frequency { axis: Axis, value: f32 },
    Action(PanelAction),
}

pub fn frequency_sliders(range: SliderRange) -> [SliderSpec; 2] {
    [
        SliderSpec {
            name: "frequencyX",
            axis: Axis::X,
            range,
        },
        SliderSpec {
            name: "frequencyY",
            axis: Axis::Y,
            range,
        },
    ]
}

/// Number of decimals needed to display values at `step` granularity.
pub fn step_decimals(step: f32) -> usize {
    if step <= 0.0 || step >= 1.0 {
        return 0;
    }
    let mut decimals = 0;
    let mut scaled = step as f64;
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-6 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;

    #[test]
    fn sliders_cover_both_axes() {
        let range = DemoConfig::default().frequency_range;
        let [x, y] = frequency_sliders(range);
        assert_eq!((x.name, x.axis), ("frequencyX", Axis::X));
        assert_eq!((y.name, y.axis), ("frequencyY", Axis::Y));
        assert_eq!((x.range.min, x.range.max, x.range.step), (0.0, 20.0, 0.01));
    }

    #[test]
    fn action_labels() {
        let labels: Vec<_> = PanelAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["Start Capture", "Stop Capture"]);
    }

    #[test]
    fn decimals_for_steps() {
        assert_eq!(step_decimals(0.01), 2);
        assert_eq!(step_decimals(0.5), 1);
        assert_eq!(step_decimals(1.0), 0);
    }
}
