//! Peak-to-trough drawdown detection over a daily price series.
//!
//! Peaks are tracked on each bar's `high` and troughs on each bar's `low`. A drawdown
//! opens once a bar trades below the running peak and closes on the first bar whose
//! `high` strictly exceeds that peak. A drawdown still open when the series ends is
//! reported without a recovery.

use crate::domain::drawdown::{Drawdown, DrawdownReport};
use crate::domain::price::{Extremum, PricePoint};
use crate::time::business_days::business_days_between;

/// Sorts `prices` by date and extracts every drawdown.
///
/// Equal dates keep their input order. The output is a pure function of the input, so
/// callers may cache it.
pub fn detect(prices: &[PricePoint]) -> DrawdownReport {
    let mut sorted_prices = prices.to_vec();
    sorted_prices.sort_by_key(|p| p.date);
    for (index, point) in sorted_prices.iter_mut().enumerate() {
        point.index = index;
    }

    let mut points = sorted_prices.iter();
    let Some(first) = points.next() else {
        return DrawdownReport::default();
    };

    let mut fold = DrawdownFold::new(first);
    for point in points {
        fold.step(point);
    }
    let drawdowns = fold.finish().into_iter().map(RawDrawdown::finalize).collect();

    DrawdownReport {
        sorted_prices,
        drawdowns,
    }
}

#[derive(Debug, Clone, Copy)]
struct RawDrawdown {
    top: Extremum,
    bottom: Extremum,
    recovery: Option<Extremum>,
}

impl RawDrawdown {
    fn finalize(self) -> Drawdown {
        let Self {
            top,
            bottom,
            recovery,
        } = self;

        Drawdown {
            top,
            bottom,
            decline_pct: -100.0 * (bottom.price - top.price) / top.price,
            recovery,
            days_top_to_bottom: business_days_between(bottom.date, top.date),
            days_bottom_to_recovery: recovery.map(|r| business_days_between(r.date, bottom.date)),
        }
    }
}

/// State threaded through the left-to-right pass.
#[derive(Debug)]
struct DrawdownFold {
    current_peak: Extremum,
    /// Lowest low since `current_peak`, excluding the peak's own bar.
    current_trough: Option<Extremum>,
    in_drawdown: bool,
    emitted: Vec<RawDrawdown>,
}

impl DrawdownFold {
    fn new(first: &PricePoint) -> Self {
        Self {
            current_peak: Extremum::high_of(first),
            current_trough: None,
            in_drawdown: false,
            emitted: Vec::new(),
        }
    }

    fn step(&mut self, point: &PricePoint) {
        if point.high > self.current_peak.price {
            let new_peak = Extremum::high_of(point);
            self.close(Some(new_peak));
            self.current_peak = new_peak;
            return;
        }

        let low = Extremum::low_of(point);
        match self.current_trough {
            Some(trough) if trough.price <= low.price => {}
            _ => self.current_trough = Some(low),
        }
        if low.price < self.current_peak.price {
            self.in_drawdown = true;
        }
    }

    fn finish(mut self) -> Vec<RawDrawdown> {
        self.close(None);
        self.emitted
    }

    fn close(&mut self, recovery: Option<Extremum>) {
        let trough = self.current_trough.take();
        if !std::mem::take(&mut self.in_drawdown) {
            return;
        }
        if let Some(bottom) = trough {
            self.emitted.push(RawDrawdown {
                top: self.current_peak,
                bottom,
                recovery,
            });
        }
    }
}
