// Focus/break countdown timer
//
// The timer is a plain state machine advanced one second per `tick`. Wall-clock
// scheduling belongs to the caller.

use eyre::{Result, eyre};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    fn other(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    work_secs: u32,
    break_secs: u32,
    remaining: u32,
    phase: Phase,
    running: bool,
}

impl FocusTimer {
    /// Paused timer at the start of a focus phase
    pub fn new(work_minutes: u32, break_minutes: u32) -> Result<Self> {
        let mut timer = Self {
            work_secs: 0,
            break_secs: 0,
            remaining: 0,
            phase: Phase::Focus,
            running: false,
        };
        timer.set_durations(work_minutes, break_minutes)?;
        Ok(timer)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Pause and rewind to a full focus phase
    pub fn reset(&mut self) {
        self.pause();
        self.phase = Phase::Focus;
        self.remaining = self.work_secs;
    }

    /// Change both phase lengths and reset
    pub fn set_durations(&mut self, work_minutes: u32, break_minutes: u32) -> Result<()> {
        if work_minutes == 0 || break_minutes == 0 {
            return Err(eyre!(
                "Timer durations must be positive (work={}m, break={}m)",
                work_minutes,
                break_minutes
            ));
        }
        self.work_secs = work_minutes.saturating_mul(60);
        self.break_secs = break_minutes.saturating_mul(60);
        self.reset();
        Ok(())
    }

    /// Advance one second
    ///
    /// Returns the new phase when the countdown ran out and the timer switched.
    pub fn tick(&mut self) -> Option<Phase> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.phase = self.phase.other();
        self.remaining = match self.phase {
            Phase::Focus => self.work_secs,
            Phase::Break => self.break_secs,
        };
        Some(self.phase)
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
