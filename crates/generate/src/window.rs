use ctrl_core::TokenId;

/// Which buffer positions feed the oracle at one step, and which output
/// row holds the prediction for the next position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// Prepend the first buffer token (the control code) to the slice.
    pub anchored: bool,
    /// First sliced buffer position.
    pub start: usize,
    /// One past the last sliced buffer position.
    pub end: usize,
    /// Output row to read.
    pub read: usize,
}

/// Plan the oracle input for step `t` (last committed position) with a
/// context window of `w` tokens.
///
/// Up to `t == w` the first `w` buffer positions are fed and row `t` is
/// read (row `w - 1` when `t == w`). Past that, the window is the first
/// token followed by the `w - 1` tokens ending at `t`, and the last row is
/// read. `w` must be at least 1.
pub fn plan(t: usize, w: usize) -> WindowPlan {
    if t <= w {
        WindowPlan {
            anchored: false,
            start: 0,
            end: w,
            read: if t < w { t } else { w.saturating_sub(1) },
        }
    } else {
        WindowPlan {
            anchored: true,
            start: t + 2 - w,
            end: t + 1,
            read: w.saturating_sub(1),
        }
    }
}

impl WindowPlan {
    /// Tokens fed to the oracle.
    pub fn len(&self) -> usize {
        usize::from(self.anchored) + self.end.saturating_sub(self.start)
    }

    /// Never true for a plan built with `w >= 1`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the planned tokens out of `buffer`; `None` if it is too short.
    pub fn gather(&self, buffer: &[TokenId]) -> Option<Vec<TokenId>> {
        let mut window = Vec::with_capacity(self.len());
        if self.anchored {
            window.push(*buffer.first()?);
        }
        window.extend_from_slice(buffer.get(self.start..self.end)?);
        Some(window)
    }
}
