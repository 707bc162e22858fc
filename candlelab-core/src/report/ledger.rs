//! Ledger sink: the output surface of a run.
//!
//! The driver streams records into a sink as it produces them, so a consumer
//! can persist rows incrementally instead of buffering the whole run. The
//! in-memory implementation buffers everything for tests and artifact
//! writers.

use crate::domain::Trade;
use crate::report::diagnostics::{DiagnosticRow, EquityPoint, RunEvent};
use crate::report::summary::Summary;

pub trait LedgerSink {
    fn diagnostic(&mut self, row: DiagnosticRow);
    fn event(&mut self, event: RunEvent);
    fn trade(&mut self, trade: &Trade);
    fn equity(&mut self, point: EquityPoint);
    /// Called exactly once, after the end-of-stream flush.
    fn summary(&mut self, summary: &Summary);
}

/// Buffering sink.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    pub diagnostics: Vec<DiagnosticRow>,
    pub events: Vec<RunEvent>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: Option<Summary>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerSink for MemoryLedger {
    fn diagnostic(&mut self, row: DiagnosticRow) {
        self.diagnostics.push(row);
    }

    fn event(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    fn trade(&mut self, trade: &Trade) {
        self.trades.push(trade.clone());
    }

    fn equity(&mut self, point: EquityPoint) {
        self.equity_curve.push(point);
    }

    fn summary(&mut self, summary: &Summary) {
        self.summary = Some(summary.clone());
    }
}
