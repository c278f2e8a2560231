/// Counts how many fixed-size ticks are due at a given wall-clock time,
/// so that simulation steps are a pure function of tick count rather than
/// wall-clock. Only `now` drives *how many* ticks to run next; everything
/// downstream of `advance` only ever sees a tick count.
#[derive(Debug, Clone, Copy)]
pub struct TickAccumulator {
    tick_duration: f64,
    next_tick: Option<f64>,
    burst_cap: u32,
}

impl TickAccumulator {
    /// `tick_rate` ticks per second. `burst_cap` bounds how many catch-up
    /// ticks a single `advance` call can report, so a long stall (GC
    /// pause, debugger breakpoint, laptop sleep) cannot wedge the loop into
    /// simulating hours of catch-up in one call.
    #[must_use]
    pub fn new(tick_rate: u32, burst_cap: u32) -> Self {
        Self {
            tick_duration: 1.0 / f64::from(tick_rate.max(1)),
            next_tick: None,
            burst_cap: burst_cap.max(1),
        }
    }

    /// Returns how many ticks are due as of `now`. Anchors on first call
    /// rather than running a catch-up burst for "all the time since the
    /// process started".
    pub fn advance(&mut self, now: f64) -> u32 {
        let Some(next_tick) = self.next_tick else {
            self.next_tick = Some(now + self.tick_duration);
            return 0;
        };
        if now < next_tick {
            return 0;
        }

        let due = ((now - next_tick) / self.tick_duration).floor() as u64 + 1;
        let ticks = due.min(u64::from(self.burst_cap));
        self.next_tick = Some(next_tick + ticks as f64 * self.tick_duration);
        ticks as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_anchors_and_returns_zero() {
        let mut accumulator = TickAccumulator::new(60, 8);
        assert_eq!(accumulator.advance(0.0), 0);
    }

    #[test]
    fn reports_one_tick_once_due() {
        let mut accumulator = TickAccumulator::new(60, 8);
        accumulator.advance(0.0);
        assert_eq!(accumulator.advance(1.0 / 60.0), 1);
    }

    #[test]
    fn never_negative_when_not_yet_due() {
        let mut accumulator = TickAccumulator::new(60, 8);
        accumulator.advance(0.0);
        assert_eq!(accumulator.advance(1e-9), 0);
    }

    #[test]
    fn caps_catch_up_bursts() {
        let mut accumulator = TickAccumulator::new(60, 4);
        accumulator.advance(0.0);
        assert_eq!(accumulator.advance(100.0), 4);
    }

    #[test]
    fn follows_the_formula_while_under_the_cap() {
        let mut accumulator = TickAccumulator::new(10, 1000);
        accumulator.advance(0.0);
        // next_tick = 0.1; now = 0.55 -> floor((0.55-0.1)/0.1)+1 = floor(4.5)+1 = 5
        let ticks = accumulator.advance(0.55);
        assert_eq!(ticks, 5);
    }

    #[test]
    fn is_monotone_and_never_double_counts() {
        let mut accumulator = TickAccumulator::new(60, 1000);
        accumulator.advance(0.0);
        let mut total = 0u32;
        let mut now = 0.0;
        for _ in 0..600 {
            now += 1.0 / 600.0;
            total += accumulator.advance(now);
        }
        // 600 sub-steps of 1/600s each cover approximately one second at
        // 60Hz; floating-point drift from repeated small additions can
        // shift the boundary tick by one in either direction.
        assert!((59..=61).contains(&total), "total was {total}");
    }
}
