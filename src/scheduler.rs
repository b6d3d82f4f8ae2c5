//! Paced city expansion
//!
//! The host simulation calls [`ExpansionScheduler::tick`] once per game
//! step. Every `ticks_between` ticks one expansion unit (a one-block growth
//! call) runs while work is queued. The scheduler needs `&mut Township`, so
//! two expansion units can never overlap on the same city.

use tracing::debug;

use crate::city::GrowthReport;
use crate::error::Result;
use crate::township::Township;

#[derive(Clone, Debug)]
pub struct ExpansionScheduler {
    pending: usize,
    ticks_between: u32,
    countdown: u32,
}

impl ExpansionScheduler {
    pub fn new(ticks_between: u32) -> Self {
        Self {
            pending: 0,
            ticks_between,
            countdown: 0,
        }
    }

    /// Queue `blocks` more expansion units.
    pub fn queue(&mut self, blocks: usize) {
        self.pending += blocks;
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }

    /// Advance one tick. Returns the report of the unit run on this tick, if
    /// any. A unit that ran dry stays queued and retries with the raised band.
    pub fn tick(&mut self, township: &mut Township) -> Result<Option<GrowthReport>> {
        if self.pending == 0 {
            return Ok(None);
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return Ok(None);
        }

        let report = township.grow(1)?;
        if report.blocks_added > 0 {
            self.pending -= 1;
        }
        self.countdown = self.ticks_between;
        debug!(pending = self.pending, band = report.band, "expansion unit ran");
        Ok(Some(report))
    }
}
