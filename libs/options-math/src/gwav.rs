use options_types::{Observation, OptionsError};
use soroban_sdk::{Env, Vec};

use crate::fixed_point_math::{exp, ln};

// ============================================================================
// Geometric weighted average (GWAV)
// ============================================================================
//
// A history is an ordered list of observations. Each one stores the
// accumulator q = sum(ln(value) * seconds held) up to its timestamp and the
// value in force from that timestamp on. The average over [t0, t1] is
// exp((q(t1) - q(t0)) / (t1 - t0)).
//
// The first observation is seeded with q = ln(value) * timestamp, as if the
// value had been held since time zero, so queries reaching before the
// history never see an implicit value of one.
//
// ============================================================================

/// Read access to a stored history, oldest first
pub trait ObservationHistory {
    fn count(&self) -> u32;
    fn observation(&self, index: u32) -> Observation;
}

impl ObservationHistory for [Observation] {
    fn count(&self) -> u32 {
        self.len() as u32
    }

    fn observation(&self, index: u32) -> Observation {
        self[index as usize].clone()
    }
}

impl ObservationHistory for Vec<Observation> {
    fn count(&self) -> u32 {
        self.len()
    }

    fn observation(&self, index: u32) -> Observation {
        self.get_unchecked(index)
    }
}

/// What a write does to the history
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GwavWrite {
    /// Replace the newest observation (same timestamp)
    Overwrite(Observation),
    /// Nothing to record, the value did not change
    Unchanged,
    /// Push a new observation
    Append(Observation),
}

/// First observation of a history
pub fn initialize(value: i128, timestamp: u64) -> Result<Observation, OptionsError> {
    let q = ln(value)?
        .checked_mul(timestamp as i128)
        .ok_or(OptionsError::MathOverflow)?;
    Ok(Observation {
        q,
        next_val: value,
        timestamp,
    })
}

/// Record `value` at `timestamp` after `last`.
///
/// At most one observation is kept per timestamp: a second write in the
/// same second replaces the pending value.
pub fn write(last: &Observation, value: i128, timestamp: u64) -> Result<GwavWrite, OptionsError> {
    if timestamp < last.timestamp {
        return Err(OptionsError::InvalidTimestamp);
    }
    if value <= 0 {
        return Err(OptionsError::LnOfNonPositive);
    }

    if timestamp == last.timestamp {
        return Ok(GwavWrite::Overwrite(Observation {
            q: last.q,
            next_val: value,
            timestamp,
        }));
    }

    if value == last.next_val {
        return Ok(GwavWrite::Unchanged);
    }

    let elapsed = (timestamp - last.timestamp) as i128;
    let q = last.q + ln(last.next_val)? * elapsed;
    Ok(GwavWrite::Append(Observation {
        q,
        next_val: value,
        timestamp,
    }))
}

/// Newest observation at or before `target`.
///
/// A target past the newest observation gets the newest one. A target
/// before the oldest gets the oldest one moved back to `target`, its
/// accumulator scaled down proportionally (constant value since time zero).
pub fn observation_before<H: ObservationHistory + ?Sized>(
    history: &H,
    target: u64,
) -> Result<Observation, OptionsError> {
    let count = history.count();
    if count == 0 {
        return Err(OptionsError::GwavNotInitialized);
    }

    let newest = history.observation(count - 1);
    if newest.timestamp <= target {
        return Ok(newest);
    }

    let oldest = history.observation(0);
    if oldest.timestamp > target {
        return Ok(Observation {
            q: scale_accumulator(oldest.q, target, oldest.timestamp),
            next_val: oldest.next_val,
            timestamp: target,
        });
    }

    // obs[lo].timestamp <= target < obs[hi].timestamp
    let mut lo = 0u32;
    let mut hi = count - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if history.observation(mid).timestamp <= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(history.observation(lo))
}

/// q * target / timestamp without a 256-bit intermediate
fn scale_accumulator(q: i128, target: u64, timestamp: u64) -> i128 {
    let target = target as i128;
    let timestamp = timestamp as i128;
    (q / timestamp) * target + (q % timestamp) * target / timestamp
}

/// Accumulator and timestamp of the observation preceding `now - seconds_ago`
pub fn query_first_before<H: ObservationHistory + ?Sized>(
    history: &H,
    now: u64,
    seconds_ago: u64,
) -> Result<(i128, u64), OptionsError> {
    let target = now
        .checked_sub(seconds_ago)
        .ok_or(OptionsError::InvalidGwavPeriod)?;
    let observation = observation_before(history, target)?;
    Ok((observation.q, observation.timestamp))
}

/// Accumulator extrapolated to exactly `now - seconds_ago`
pub fn query_first_before_and_scale<H: ObservationHistory + ?Sized>(
    history: &H,
    now: u64,
    seconds_ago: u64,
) -> Result<(i128, u64), OptionsError> {
    let target = now
        .checked_sub(seconds_ago)
        .ok_or(OptionsError::InvalidGwavPeriod)?;
    let observation = observation_before(history, target)?;
    let elapsed = (target - observation.timestamp) as i128;
    let q = observation.q + ln(observation.next_val)? * elapsed;
    Ok((q, target))
}

/// Geometric average between `now - seconds_ago_a` and `now - seconds_ago_b`.
///
/// `seconds_ago_a` is the older end of the window. When both ends meet the
/// result is the average since time zero.
pub fn gwav_for_period<H: ObservationHistory + ?Sized>(
    history: &H,
    now: u64,
    seconds_ago_a: u64,
    seconds_ago_b: u64,
) -> Result<i128, OptionsError> {
    if seconds_ago_a < seconds_ago_b {
        return Err(OptionsError::InvalidGwavPeriod);
    }

    let (q0, t0) = query_first_before_and_scale(history, now, seconds_ago_a)?;
    let (q1, t1) = query_first_before_and_scale(history, now, seconds_ago_b)?;

    if t0 == t1 {
        if t1 == 0 {
            return Err(OptionsError::InvalidGwavPeriod);
        }
        return exp(q1 / t1 as i128);
    }
    exp((q1 - q0) / (t1 - t0) as i128)
}

/// Raw accumulators at each of `seconds_agos`
pub fn observe<H: ObservationHistory + ?Sized>(
    env: &Env,
    history: &H,
    now: u64,
    seconds_agos: &Vec<u64>,
) -> Result<Vec<i128>, OptionsError> {
    let mut accumulators = Vec::new(env);
    for seconds_ago in seconds_agos.iter() {
        let (q, _) = query_first_before_and_scale(history, now, seconds_ago)?;
        accumulators.push_back(q);
    }
    Ok(accumulators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::observations_strictly_increasing;
    use options_types::DECIMAL_UNIT;
    use soroban_sdk::{vec, Env};

    extern crate std;
    use std::vec::Vec as StdVec;

    /// Apply writes the way a store would
    fn record(history: &mut StdVec<Observation>, value: i128, timestamp: u64) {
        if history.is_empty() {
            history.push(initialize(value, timestamp).unwrap());
            return;
        }
        let last = history[history.len() - 1].clone();
        match write(&last, value, timestamp).unwrap() {
            GwavWrite::Overwrite(obs) => {
                let index = history.len() - 1;
                history[index] = obs;
            }
            GwavWrite::Unchanged => {}
            GwavWrite::Append(obs) => history.push(obs),
        }
    }

    fn assert_close(actual: i128, expected: i128, tolerance: i128) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "expected {} got {} (diff {})",
            expected,
            actual,
            diff
        );
    }

    // === write ===

    #[test]
    fn test_initialize_seeds_accumulator_with_timestamp() {
        let obs = initialize(2 * DECIMAL_UNIT, 1_000).unwrap();
        assert_eq!(obs.q, ln(2 * DECIMAL_UNIT).unwrap() * 1_000);
        assert_eq!(obs.next_val, 2 * DECIMAL_UNIT);
        assert_eq!(obs.timestamp, 1_000);
    }

    #[test]
    fn test_initialize_rejects_non_positive_value() {
        assert_eq!(initialize(0, 1_000), Err(OptionsError::LnOfNonPositive));
    }

    #[test]
    fn test_write_earlier_timestamp_fails() {
        let last = initialize(DECIMAL_UNIT, 1_000).unwrap();
        assert_eq!(
            write(&last, 2 * DECIMAL_UNIT, 999),
            Err(OptionsError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_write_same_timestamp_overwrites() {
        let last = initialize(DECIMAL_UNIT, 1_000).unwrap();
        let result = write(&last, 3 * DECIMAL_UNIT, 1_000).unwrap();
        assert_eq!(
            result,
            GwavWrite::Overwrite(Observation {
                q: last.q,
                next_val: 3 * DECIMAL_UNIT,
                timestamp: 1_000,
            })
        );
    }

    #[test]
    fn test_write_same_value_is_skipped() {
        let last = initialize(DECIMAL_UNIT, 1_000).unwrap();
        assert_eq!(write(&last, DECIMAL_UNIT, 2_000), Ok(GwavWrite::Unchanged));
    }

    #[test]
    fn test_write_appends_held_value() {
        let last = initialize(2 * DECIMAL_UNIT, 1_000).unwrap();
        let result = write(&last, 3 * DECIMAL_UNIT, 1_500).unwrap();
        let expected_q = last.q + ln(2 * DECIMAL_UNIT).unwrap() * 500;
        assert_eq!(
            result,
            GwavWrite::Append(Observation {
                q: expected_q,
                next_val: 3 * DECIMAL_UNIT,
                timestamp: 1_500,
            })
        );
    }

    #[test]
    fn test_write_rejects_non_positive_value() {
        let last = initialize(DECIMAL_UNIT, 1_000).unwrap();
        assert_eq!(write(&last, 0, 2_000), Err(OptionsError::LnOfNonPositive));
    }

    // === lookup ===

    #[test]
    fn test_empty_history_fails() {
        let history: [Observation; 0] = [];
        assert_eq!(
            observation_before(&history[..], 10),
            Err(OptionsError::GwavNotInitialized)
        );
        assert_eq!(
            gwav_for_period(&history[..], 10, 5, 0),
            Err(OptionsError::GwavNotInitialized)
        );
    }

    #[test]
    fn test_observation_before_binary_search() {
        let mut history = StdVec::new();
        for (i, ts) in [100u64, 200, 300, 400, 500, 600, 700].iter().enumerate() {
            record(&mut history, (i as i128 + 1) * DECIMAL_UNIT, *ts);
        }
        assert!(observations_strictly_increasing(&history[..]));

        assert_eq!(observation_before(&history[..], 100).unwrap().timestamp, 100);
        assert_eq!(observation_before(&history[..], 199).unwrap().timestamp, 100);
        assert_eq!(observation_before(&history[..], 200).unwrap().timestamp, 200);
        assert_eq!(observation_before(&history[..], 450).unwrap().timestamp, 400);
        assert_eq!(observation_before(&history[..], 699).unwrap().timestamp, 600);
        assert_eq!(observation_before(&history[..], 5_000).unwrap().timestamp, 700);
    }

    #[test]
    fn test_observation_before_oldest_scales_back() {
        let mut history = StdVec::new();
        record(&mut history, 2 * DECIMAL_UNIT, 1_000);
        record(&mut history, 4 * DECIMAL_UNIT, 2_000);

        let obs = observation_before(&history[..], 250).unwrap();
        assert_eq!(obs.timestamp, 250);
        assert_eq!(obs.next_val, 2 * DECIMAL_UNIT);
        assert_eq!(obs.q, ln(2 * DECIMAL_UNIT).unwrap() * 250);
    }

    // === GWAV ===

    #[test]
    fn test_constant_value_round_trip() {
        let value = 1_234_567_890_000_000_000;
        let mut history = StdVec::new();
        for ts in (1_000u64..=10_000).step_by(1_000) {
            record(&mut history, value, ts);
        }
        // identical writes do not grow the history
        assert_eq!(history.len(), 1);

        for (a, b) in [(9_000u64, 0u64), (5_000, 1_000), (300, 100), (10_000, 0)] {
            let avg = gwav_for_period(&history[..], 10_000, a, b).unwrap();
            assert_close(avg, value, 1_000);
        }
    }

    #[test]
    fn test_step_from_one_to_two() {
        // seeded at 1.0 at t=0, 2.0 from t=100
        let mut history = StdVec::new();
        record(&mut history, DECIMAL_UNIT, 0);
        record(&mut history, 2 * DECIMAL_UNIT, 100);

        // over [0, 100] the value was 1.0 throughout
        assert_close(
            gwav_for_period(&history[..], 100, 100, 0).unwrap(),
            DECIMAL_UNIT,
            2,
        );

        // over [0, 200] half the time at each: sqrt(2)
        let avg = gwav_for_period(&history[..], 200, 200, 0).unwrap();
        assert_close(avg, 1_414_213_562_373_095_048, 10);
        assert!(avg > DECIMAL_UNIT && avg < 2 * DECIMAL_UNIT);
        // geometric mean below the arithmetic mean of 1.5
        assert!(avg < 15 * DECIMAL_UNIT / 10);
    }

    #[test]
    fn test_window_inside_history() {
        let mut history = StdVec::new();
        record(&mut history, DECIMAL_UNIT, 1_000);
        record(&mut history, 4 * DECIMAL_UNIT, 2_000);
        record(&mut history, DECIMAL_UNIT, 3_000);

        // [1500, 2500]: 1.0 for 500s, 4.0 for 500s => 2.0
        let avg = gwav_for_period(&history[..], 3_500, 2_000, 1_000).unwrap();
        assert_close(avg, 2 * DECIMAL_UNIT, 100);

        // [2000, 3000]: 4.0 throughout
        let avg = gwav_for_period(&history[..], 3_000, 1_000, 0).unwrap();
        assert_close(avg, 4 * DECIMAL_UNIT, 100);
    }

    #[test]
    fn test_window_before_history_uses_first_value() {
        let mut history = StdVec::new();
        record(&mut history, 3 * DECIMAL_UNIT, 1_000);
        record(&mut history, DECIMAL_UNIT, 2_000);

        // [200, 700] lies before the first observation
        let avg = gwav_for_period(&history[..], 2_500, 2_300, 1_800).unwrap();
        assert_close(avg, 3 * DECIMAL_UNIT, 100);
    }

    #[test]
    fn test_overwrite_only_affects_future() {
        let mut history = StdVec::new();
        record(&mut history, DECIMAL_UNIT, 1_000);
        record(&mut history, 4 * DECIMAL_UNIT, 2_000);
        record(&mut history, 9 * DECIMAL_UNIT, 2_000);
        assert_eq!(history.len(), 2);

        let avg = gwav_for_period(&history[..], 3_000, 1_000, 0).unwrap();
        assert_close(avg, 9 * DECIMAL_UNIT, 100);
    }

    #[test]
    fn test_coinciding_ends_average_since_zero() {
        let mut history = StdVec::new();
        record(&mut history, 2 * DECIMAL_UNIT, 1_000);
        let avg = gwav_for_period(&history[..], 1_000, 0, 0).unwrap();
        assert_close(avg, 2 * DECIMAL_UNIT, 10);
    }

    #[test]
    fn test_invalid_periods() {
        let mut history = StdVec::new();
        record(&mut history, DECIMAL_UNIT, 0);
        // newer end older than the older end
        assert_eq!(
            gwav_for_period(&history[..], 1_000, 100, 200),
            Err(OptionsError::InvalidGwavPeriod)
        );
        // reaching before time zero
        assert_eq!(
            gwav_for_period(&history[..], 1_000, 2_000, 0),
            Err(OptionsError::InvalidGwavPeriod)
        );
        // empty window at time zero
        assert_eq!(
            gwav_for_period(&history[..], 1_000, 1_000, 1_000),
            Err(OptionsError::InvalidGwavPeriod)
        );
    }

    #[test]
    fn test_observe_and_soroban_vec_history() {
        let env = Env::default();
        let first = initialize(DECIMAL_UNIT, 100).unwrap();
        let second = match write(&first, 2 * DECIMAL_UNIT, 200).unwrap() {
            GwavWrite::Append(obs) => obs,
            other => panic!("unexpected {:?}", other),
        };
        let (first_q, second_q) = (first.q, second.q);
        let history: Vec<Observation> = vec![&env, first, second];
        assert!(observations_strictly_increasing(&history));

        let accumulators = observe(&env, &history, 300, &vec![&env, 200u64, 0u64]).unwrap();
        assert_eq!(accumulators.len(), 2);
        assert_eq!(accumulators.get_unchecked(0), first_q);
        assert_eq!(
            accumulators.get_unchecked(1),
            second_q + ln(2 * DECIMAL_UNIT).unwrap() * 100
        );

        let (q, timestamp) = query_first_before(&history, 300, 150).unwrap();
        assert_eq!(timestamp, 100);
        assert_eq!(q, first_q);
    }
}
