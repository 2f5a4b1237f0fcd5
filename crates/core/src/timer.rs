// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! One-shot countdown used to model conversion latency.

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct OneShotTimer {
    remaining: u64,
    running: bool,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `cycles` ticks. Expiry is reported from a later [`tick`]
    /// call, never synchronously from here. Arming a running timer restarts
    /// the countdown.
    ///
    /// [`tick`]: OneShotTimer::tick
    pub fn start(&mut self, cycles: u64) {
        debug_assert!(cycles > 0, "a zero-length countdown would never fire");
        self.remaining = cycles;
        self.running = true;
    }

    /// Advance one cycle. Returns true exactly once, on the expiring tick.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cancel(&mut self) {
        self.remaining = 0;
        self.running = false;
    }
}
