//! Validation-loss driven callbacks: early stopping and learning-rate decay.

/// Stops training once the validation loss has not improved for `patience`
/// consecutive epochs.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best: Option<f64>,
    wait: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// New best loss; the caller should keep these weights.
    Improved,
    Continue,
    Stop,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best: None,
            wait: 0,
        }
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    pub fn observe(&mut self, loss: f64) -> Verdict {
        if self.best.is_none_or(|best| loss < best) {
            self.best = Some(loss);
            self.wait = 0;
            return Verdict::Improved;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            Verdict::Stop
        } else {
            Verdict::Continue
        }
    }
}

/// Multiplies the learning rate by `factor` after `patience` epochs without
/// improvement, never going below `min_lr`.
#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    lr: f64,
    factor: f64,
    patience: usize,
    min_lr: f64,
    best: Option<f64>,
    wait: usize,
}

impl ReduceLrOnPlateau {
    pub fn new(initial_lr: f64, factor: f64, patience: usize, min_lr: f64) -> Self {
        Self {
            lr: initial_lr,
            factor,
            patience,
            min_lr,
            best: None,
            wait: 0,
        }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Records one epoch's loss and returns the learning rate for the next.
    pub fn observe(&mut self, loss: f64) -> f64 {
        if self.best.is_none_or(|best| loss < best) {
            self.best = Some(loss);
            self.wait = 0;
            return self.lr;
        }

        self.wait += 1;
        if self.wait >= self.patience && self.lr > self.min_lr {
            self.lr = (self.lr * self.factor).max(self.min_lr);
            self.wait = 0;
        }
        self.lr
    }
}
