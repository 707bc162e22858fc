//! Run orchestration: one engine per symbol, fanned out with rayon.
//!
//! Each symbol's simulation owns its kernels, ledger, and equity state;
//! nothing is shared between runs, so summaries merge trivially at the
//! caller.

use rayon::prelude::*;

use candlelab_core::data::BarSource;
use candlelab_core::engine::{CancelToken, Engine, EngineError, RunOutcome, StrategyConfig};
use candlelab_core::report::MemoryLedger;

/// One symbol's run request.
pub struct RunJob {
    pub symbol: String,
    pub config: StrategyConfig,
    pub source: BarSource,
}

/// A completed run: the outcome plus the buffered ledger for artifact
/// writing.
pub struct RunArtifacts {
    pub outcome: RunOutcome,
    pub ledger: MemoryLedger,
}

/// Run a single symbol to completion.
pub fn run_symbol(
    symbol: &str,
    config: StrategyConfig,
    source: &BarSource,
    cancel: &CancelToken,
) -> Result<RunArtifacts, EngineError> {
    let engine = Engine::new(symbol, config)?;
    let mut ledger = MemoryLedger::new();
    let outcome = engine.run(source, &mut ledger, cancel)?;
    Ok(RunArtifacts { outcome, ledger })
}

/// Run many symbols in parallel, one engine per symbol. Results keep job
/// order.
pub fn run_many(
    jobs: Vec<RunJob>,
    cancel: &CancelToken,
) -> Vec<(String, Result<RunArtifacts, EngineError>)> {
    jobs.into_par_iter()
        .map(|job| {
            let result = run_symbol(&job.symbol, job.config, &job.source, cancel);
            (job.symbol, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlelab_core::domain::Bar;
    use candlelab_core::engine::config::test_support::config_with;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn flat_bars(count: usize) -> BarSource {
        let bars: Vec<Bar> = (0..count)
            .map(|i| {
                Bar::new(
                    i as i64 * 60_000,
                    dec!(100),
                    dec!(101),
                    dec!(99),
                    dec!(100),
                    Decimal::from(10),
                )
            })
            .collect();
        BarSource::new(bars).unwrap()
    }

    #[test]
    fn run_symbol_produces_ledger_rows() {
        let source = flat_bars(120);
        let artifacts = run_symbol(
            "TEST",
            config_with(|_| {}),
            &source,
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(artifacts.ledger.diagnostics.len(), 120);
        assert_eq!(artifacts.ledger.equity_curve.len(), 120);
        assert!(artifacts.ledger.summary.is_some());
        assert!(!artifacts.outcome.cancelled);
    }

    #[test]
    fn run_many_keeps_per_symbol_isolation() {
        let jobs = vec![
            RunJob {
                symbol: "AAA".into(),
                config: config_with(|_| {}),
                source: flat_bars(120),
            },
            RunJob {
                symbol: "BBB".into(),
                config: config_with(|_| {}),
                source: flat_bars(150),
            },
        ];
        let results = run_many(jobs, &CancelToken::new());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "AAA");
        assert_eq!(results[1].0, "BBB");
        let a = results[0].1.as_ref().unwrap();
        let b = results[1].1.as_ref().unwrap();
        assert_eq!(a.ledger.diagnostics.len(), 120);
        assert_eq!(b.ledger.diagnostics.len(), 150);
    }
}
