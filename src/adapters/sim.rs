//! Simulated laser timer and enable pin.
//!
//! Holds the register state a real timer would and keeps a bounded
//! history of every write, so host builds and tests can check both the
//! final output state and the order it was reached in.

use heapless::Deque;

use crate::app::ports::{LaserOutputPort, PulseOutputPort, TimerProgram};

/// Depth of the write history.
pub const HISTORY_DEPTH: usize = 32;

/// One register or pin write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputWrite {
    EnablePin(bool),
    Duty(u16),
    MasterOutput(bool),
    Counter(bool),
    TimerBase(TimerProgram),
    Pulse(u16),
}

#[derive(Debug)]
pub struct SimOutput {
    /// `None` when the enable pin is not wired.
    enable_pin: Option<bool>,
    duty: u16,
    /// `None` when the timer has no master output enable bit.
    master_output: Option<bool>,
    counter_enabled: bool,
    timer: Option<TimerProgram>,
    history: Deque<OutputWrite, HISTORY_DEPTH>,
}

impl SimOutput {
    pub fn new() -> Self {
        Self {
            enable_pin: Some(false),
            duty: 0,
            master_output: Some(false),
            counter_enabled: false,
            timer: None,
            history: Deque::new(),
        }
    }

    /// Board variant without a laser enable pin.
    pub fn without_enable_pin() -> Self {
        Self {
            enable_pin: None,
            ..Self::new()
        }
    }

    /// General-purpose timer without a master output enable bit.
    pub fn without_master_output() -> Self {
        Self {
            master_output: None,
            ..Self::new()
        }
    }

    /// Physical enable pin level (false when not wired).
    pub fn enable_pin_level(&self) -> bool {
        self.enable_pin.unwrap_or(false)
    }

    /// Change the pin behind the core's back.
    pub fn force_enable_pin(&mut self, high: bool) {
        if self.enable_pin.is_some() {
            self.enable_pin = Some(high);
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn master_output_enabled(&self) -> bool {
        self.master_output.unwrap_or(true)
    }

    pub fn counter_enabled(&self) -> bool {
        self.counter_enabled
    }

    pub fn timer(&self) -> Option<TimerProgram> {
        self.timer
    }

    /// Compare value that actually reaches the pin.
    pub fn line_duty(&self) -> u16 {
        if self.counter_enabled && self.master_output_enabled() {
            self.duty
        } else {
            0
        }
    }

    pub fn history(&self) -> &Deque<OutputWrite, HISTORY_DEPTH> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Most recent pulse length, if any pulse was fired.
    pub fn last_pulse(&self) -> Option<u16> {
        self.history.iter().rev().find_map(|w| match w {
            OutputWrite::Pulse(len) => Some(*len),
            _ => None,
        })
    }

    fn record(&mut self, write: OutputWrite) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(write);
    }
}

impl Default for SimOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl LaserOutputPort for SimOutput {
    fn has_enable_pin(&self) -> bool {
        self.enable_pin.is_some()
    }

    fn set_enable_pin(&mut self, high: bool) {
        if self.enable_pin.is_some() {
            self.enable_pin = Some(high);
            self.record(OutputWrite::EnablePin(high));
        }
    }

    fn read_enable_pin(&mut self) -> bool {
        self.enable_pin_level()
    }

    fn set_duty_register(&mut self, value: u16) {
        self.duty = value;
        self.record(OutputWrite::Duty(value));
    }

    fn has_master_output_enable(&self) -> bool {
        self.master_output.is_some()
    }

    fn set_master_output_enable(&mut self, on: bool) {
        if self.master_output.is_some() {
            self.master_output = Some(on);
            self.record(OutputWrite::MasterOutput(on));
        }
    }

    fn set_counter_enable(&mut self, on: bool) {
        self.counter_enabled = on;
        self.record(OutputWrite::Counter(on));
    }

    fn program_timer_base(&mut self, program: TimerProgram) {
        self.timer = Some(program);
        self.record(OutputWrite::TimerBase(program));
    }
}

impl PulseOutputPort for SimOutput {
    fn start_pulse(&mut self, length: u16) {
        self.record(OutputWrite::Pulse(length));
    }
}
