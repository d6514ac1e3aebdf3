use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::Lerp;

/// An attribute value that is either constant or time-sampled.
///
/// JSON form is either the bare value or `{ "time_samples": [{ "time": t, "value": v }, ...] }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Sampled<T> {
    /// Time samples sorted by strictly increasing `time`.
    TimeSamples {
        /// Samples sorted by time.
        time_samples: Vec<TimeSample<T>>,
    },
    /// Value independent of time.
    Constant(T),
}

/// One authored sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeSample<T> {
    /// Time code (frame).
    pub time: f64,
    /// Value at `time`.
    pub value: T,
}

impl<T> Sampled<T> {
    /// Build a constant attribute.
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    /// Build a time-sampled attribute from `(time, value)` pairs.
    pub fn from_samples(samples: impl IntoIterator<Item = (f64, T)>) -> Self {
        Self::TimeSamples {
            time_samples: samples
                .into_iter()
                .map(|(time, value)| TimeSample { time, value })
                .collect(),
        }
    }

    /// Whether the value can change over time.
    pub fn is_varying(&self) -> bool {
        matches!(self, Self::TimeSamples { time_samples } if time_samples.len() > 1)
    }

    /// Validate sample ordering.
    pub fn validate(&self, what: &str) -> StagecastResult<()> {
        let Self::TimeSamples { time_samples } = self else {
            return Ok(());
        };
        if time_samples.is_empty() {
            return Err(StagecastError::scene(format!(
                "{what}: time_samples must not be empty"
            )));
        }
        if time_samples.iter().any(|s| !s.time.is_finite()) {
            return Err(StagecastError::scene(format!(
                "{what}: sample times must be finite"
            )));
        }
        if !time_samples.windows(2).all(|w| w[0].time < w[1].time) {
            return Err(StagecastError::scene(format!(
                "{what}: sample times must be strictly increasing"
            )));
        }
        Ok(())
    }
}

impl<T> Sampled<T>
where
    T: Lerp + Clone,
{
    /// Value at `time`.
    ///
    /// Times before the first or after the last sample hold the end value; times in between
    /// interpolate linearly between the bracketing samples.
    pub fn sample(&self, time: f64) -> StagecastResult<T> {
        let samples = match self {
            Self::Constant(v) => return Ok(v.clone()),
            Self::TimeSamples { time_samples } => time_samples,
        };
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Err(StagecastError::scene("attribute has no time samples"));
        };

        let idx = samples.partition_point(|s| s.time <= time);
        if idx == 0 {
            return Ok(first.value.clone());
        }
        if idx >= samples.len() {
            return Ok(last.value.clone());
        }

        let a = &samples[idx - 1];
        let b = &samples[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return Ok(a.value.clone());
        }
        let t = (time - a.time) / span;
        Ok(T::lerp(&a.value, &b.value, t))
    }
}

impl<T: Default> Default for Sampled<T> {
    fn default() -> Self {
        Self::Constant(T::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/samples.rs"]
mod tests;
