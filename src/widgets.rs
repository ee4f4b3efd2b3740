//! Input primitives as plain data.
//!
//! `Slider` reflects a one-element integer value and turns raw control input into
//! the next value. `RadioGroup` is an explicit key -> {label, selected} mapping,
//! so exactly one option is ever selected and nothing inspects children at runtime.

use serde::Serialize;

/// Single-thumb range control. The controlled value is always one integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slider {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    value: [i64; 1],
}

/// Serializable snapshot handed to a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SliderView {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub value: [i64; 1],
}

impl Default for Slider {
    fn default() -> Self {
        Self::new(0, 100, 1, [1])
    }
}

impl Slider {
    pub fn new(min: i64, max: i64, step: i64, value: [i64; 1]) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let step = step.max(1);
        let mut s = Self { min, max, step, value: [min] };
        s.value = [s.normalize(value[0])];
        s
    }

    pub fn value(&self) -> [i64; 1] {
        self.value
    }

    /// Controlled update from the owner.
    pub fn set_value(&mut self, value: [i64; 1]) {
        self.value = [self.normalize(value[0])];
    }

    /// User moved the thumb. Returns the value to emit, or `None` for unparsable input.
    pub fn on_input(&self, raw: &str) -> Option<[i64; 1]> {
        let n = raw.trim().parse::<i64>().ok()?;
        Some([self.normalize(n)])
    }

    pub fn view(&self) -> SliderView {
        SliderView { min: self.min, max: self.max, step: self.step, value: self.value }
    }

    /// Snap to the nearest step from `min`, then clamp into bounds.
    fn normalize(&self, n: i64) -> i64 {
        let clamped = n.clamp(self.min, self.max);
        let offset = clamped - self.min;
        let snapped = self.min + ((offset + self.step / 2) / self.step) * self.step;
        if snapped > self.max { snapped - self.step } else { snapped }
    }
}

/// One option of a radio group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RadioItem {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadioGroup {
    options: Vec<(String, String)>,
    selected: String,
}

impl RadioGroup {
    /// `options` are (key, label) pairs in display order. An unknown `selected`
    /// falls back to the first option.
    pub fn new<K, L>(options: impl IntoIterator<Item = (K, L)>, selected: &str) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let options: Vec<(String, String)> = options.into_iter().map(|(k, l)| (k.into(), l.into())).collect();
        let selected = if options.iter().any(|(k, _)| k == selected) {
            selected.to_string()
        } else {
            options.first().map(|(k, _)| k.clone()).unwrap_or_default()
        };
        Self { options, selected }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// User picked `key`. Returns the key to emit when it names an option.
    pub fn on_select(&self, key: &str) -> Option<String> {
        self.options.iter().find(|(k, _)| k == key).map(|(k, _)| k.clone())
    }

    /// Controlled update from the owner; unknown keys are ignored.
    pub fn set_selected(&mut self, key: &str) -> bool {
        match self.on_select(key) {
            Some(k) => {
                self.selected = k;
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> Vec<RadioItem> {
        self.options
            .iter()
            .map(|(key, label)| RadioItem { key: key.clone(), label: label.clone(), selected: *key == self.selected })
            .collect()
    }
}
