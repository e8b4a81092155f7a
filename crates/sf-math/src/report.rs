//! Operator-facing RTP analysis report
//!
//! Formatting only; nothing in gameplay consumes this output.

use std::fmt::Write;

use crate::engine::{RtpEngine, VarianceLevel};

impl RtpEngine {
    /// Render the full analysis report as plain text
    pub fn analysis_report(&self) -> String {
        let theoretical_rtp = self.theoretical_rtp();
        let house_edge = self.house_edge();
        let variance = self.analyze_variance();
        let probabilities = self.symbol_probabilities();
        let target_rtp = self.rtp_settings().target_rtp;

        let mut out = String::new();

        let _ = writeln!(out, "RTP ANALYSIS REPORT");
        let _ = writeln!(out, "===================");
        let _ = writeln!(out);
        let _ = writeln!(out, "Core metrics:");
        let _ = writeln!(out, "  Theoretical RTP:  {theoretical_rtp:.2}%");
        let _ = writeln!(out, "  House edge:       {house_edge:.2}%");
        let _ = writeln!(out, "  Target RTP:       {target_rtp:.2}%");
        let _ = writeln!(
            out,
            "  RTP difference:   {:+.2}%",
            theoretical_rtp - target_rtp
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Variance:");
        let _ = writeln!(out, "  Level:              {}", variance.variance_level);
        let _ = writeln!(
            out,
            "  Standard deviation: {:.2}",
            variance.standard_deviation
        );
        let _ = writeln!(
            out,
            "  Expected win/spin:  {:.4}x bet",
            variance.expected_value
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Symbol probabilities:");
        for (symbol, p) in &probabilities {
            let _ = writeln!(out, "  {symbol:<10} {p:.4}  ({:.2}%)", p * 100.0);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Combination analysis:");
        for (combo, payout) in self.paytable().iter() {
            let p = self.combination_probability(combo);
            let contribution = p * payout * 100.0;
            if p > 0.0 {
                let _ = writeln!(
                    out,
                    "  {combo}: pays {payout:.2}x | 1 in {:.0} | +{contribution:.3}% RTP",
                    1.0 / p
                );
            } else {
                let _ = writeln!(out, "  {combo}: pays {payout:.2}x | unreachable");
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Tuning notes:");
        if theoretical_rtp > target_rtp + 1.0 {
            let _ = writeln!(out, "  - RTP above target: consider reducing paytable values");
        } else if theoretical_rtp < target_rtp - 1.0 {
            let _ = writeln!(out, "  - RTP below target: consider raising paytable values");
        } else {
            let _ = writeln!(out, "  - RTP is balanced against the target");
        }
        match variance.variance_level {
            VarianceLevel::Low => {
                let _ = writeln!(
                    out,
                    "  - Low volatility: higher-value combinations would add excitement"
                );
            }
            VarianceLevel::High => {
                let _ = writeln!(
                    out,
                    "  - High volatility: more frequent small wins would smooth sessions"
                );
            }
            VarianceLevel::Medium => {}
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{BonusSettings, RtpEngine, RtpSettings};
    use crate::paytable::{Combo, PayTable};
    use crate::symbols::{SymbolDef, SymbolSet};

    #[test]
    fn test_report_mentions_core_metrics() {
        let symbols = SymbolSet::from_entries([
            ("A", SymbolDef::regular(30)),
            ("B", SymbolDef::regular(70)),
        ]);
        let paytable = PayTable::from_entries([(Combo::triple("A"), 5.0)]);
        let engine = RtpEngine::new(
            symbols,
            paytable,
            BonusSettings::default(),
            RtpSettings::default(),
        );

        let report = engine.analysis_report();
        assert!(report.contains("Theoretical RTP"));
        assert!(report.contains("House edge"));
        assert!(report.contains("A+A+A"));
        assert!(report.contains("Symbol probabilities"));
    }
}
