// ---------------------------------------------------------------------------
// First-order plant: the process value moves by `gain * command` each tick
// ---------------------------------------------------------------------------

/// Crude motor-speed model used to close a loop around a controller.
///
/// Each tick the speed integrates the command, so a constant command ramps
/// the speed linearly. Not a physical model; just enough dynamics to show
/// overshoot and settling.
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    pub gain: f64,
    value: f64,
}

impl FirstOrderPlant {
    pub fn new(gain: f64) -> Self {
        Self { gain, value: 0.0 }
    }

    pub fn with_initial(gain: f64, value: f64) -> Self {
        Self { gain, value }
    }

    /// Apply one tick of `command` and return the new process value.
    pub fn respond(&mut self, command: f64) -> f64 {
        self.value += self.gain * command;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_command_ramps() {
        let mut p = FirstOrderPlant::new(0.8);
        p.respond(10.0);
        let v = p.respond(10.0);
        assert!((v - 16.0).abs() < 1e-12);
    }
}
