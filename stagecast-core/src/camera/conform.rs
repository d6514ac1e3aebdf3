use crate::camera::frustum::Window;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a camera window is adjusted to a target aspect ratio.
pub enum ConformPolicy {
    /// Keep the vertical extent, resize the horizontal one.
    #[default]
    MatchVertically,
    /// Keep the horizontal extent, resize the vertical one.
    MatchHorizontally,
    /// Grow one extent so the original window fits inside the result.
    Fit,
    /// Shrink one extent so the result fits inside the original window.
    Crop,
    /// Leave the window unchanged.
    DontConform,
}

impl std::fmt::Display for ConformPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MatchVertically => "match_vertically",
            Self::MatchHorizontally => "match_horizontally",
            Self::Fit => "fit",
            Self::Crop => "crop",
            Self::DontConform => "dont_conform",
        };
        f.write_str(s)
    }
}

impl ConformPolicy {
    /// Reduce `Fit` and `Crop` to one of the match policies for a window of `aspect`.
    fn resolve(self, aspect: f64, target_aspect: f64) -> Self {
        match self {
            Self::Fit | Self::Crop => {
                if (self == Self::Fit) ^ (aspect > target_aspect) {
                    Self::MatchVertically
                } else {
                    Self::MatchHorizontally
                }
            }
            other => other,
        }
    }
}

/// Adjust `window` to `target_aspect` (width / height), keeping its center.
pub(crate) fn conform_window(window: Window, policy: ConformPolicy, target_aspect: f64) -> Window {
    if !(target_aspect.is_finite() && target_aspect > 0.0) {
        return window;
    }
    let [w, h] = window.size();
    let aspect = if h != 0.0 { w / h } else { 1.0 };
    let [cx, cy] = window.center();
    match policy.resolve(aspect, target_aspect) {
        ConformPolicy::MatchVertically => {
            let half_w = 0.5 * h * target_aspect;
            Window::new([cx - half_w, window.min[1]], [cx + half_w, window.max[1]])
        }
        ConformPolicy::MatchHorizontally => {
            let half_h = 0.5 * w / target_aspect;
            Window::new([window.min[0], cy - half_h], [window.max[0], cy + half_h])
        }
        _ => window,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/conform.rs"]
mod tests;
