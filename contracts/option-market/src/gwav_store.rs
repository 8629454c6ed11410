use options_math::gwav::{self, GwavWrite, ObservationHistory};
use options_math::multiply_decimal;
use options_types::{GreekCacheParameters, GwavKey, Observation, OptionsError};
use soroban_sdk::{log, Env, Vec};

use crate::storage::{get_gwav_count, get_gwav_observation, set_gwav_count, set_gwav_observation};

/// A GWAV history read straight from persistent storage
pub struct StoredHistory<'a> {
    env: &'a Env,
    key: GwavKey,
    count: u32,
}

impl<'a> StoredHistory<'a> {
    pub fn load(env: &'a Env, key: GwavKey) -> Self {
        let count = get_gwav_count(env, &key);
        Self { env, key, count }
    }
}

impl ObservationHistory for StoredHistory<'_> {
    fn count(&self) -> u32 {
        self.count
    }

    fn observation(&self, index: u32) -> Observation {
        // entries below count are never removed
        get_gwav_observation(self.env, &self.key, index).expect("gwav observation missing")
    }
}

/// Record a new value for `key` at the current ledger time
pub fn record(env: &Env, key: GwavKey, value: i128) -> Result<(), OptionsError> {
    let now = env.ledger().timestamp();
    let count = get_gwav_count(env, &key);
    if count == 0 {
        set_gwav_observation(env, &key, 0, &gwav::initialize(value, now)?);
        set_gwav_count(env, &key, 1);
        return Ok(());
    }

    let last = get_gwav_observation(env, &key, count - 1).ok_or(OptionsError::GwavNotInitialized)?;
    match gwav::write(&last, value, now)? {
        GwavWrite::Overwrite(observation) => {
            set_gwav_observation(env, &key, count - 1, &observation)
        }
        GwavWrite::Unchanged => {}
        GwavWrite::Append(observation) => {
            set_gwav_observation(env, &key, count, &observation);
            set_gwav_count(env, &key, count + 1);
        }
    }
    Ok(())
}

/// Geometric average of `key` over the last `seconds_ago` seconds
pub fn average(env: &Env, key: GwavKey, seconds_ago: u64) -> Result<i128, OptionsError> {
    let history = StoredHistory::load(env, key);
    gwav::gwav_for_period(&history, env.ledger().timestamp(), seconds_ago, 0).map_err(|err| {
        log!(env, "gwav query failed", seconds_ago);
        err
    })
}

pub fn iv_gwav(env: &Env, board_id: u32, seconds_ago: u64) -> Result<i128, OptionsError> {
    average(env, GwavKey::BoardIv(board_id), seconds_ago)
}

/// Skew average clamped to the configured floor and cap
pub fn skew_gwav(
    env: &Env,
    params: &GreekCacheParameters,
    strike_id: u32,
    seconds_ago: u64,
) -> Result<i128, OptionsError> {
    let skew = average(env, GwavKey::StrikeSkew(strike_id), seconds_ago)?;
    Ok(skew.clamp(params.gwav_skew_floor, params.gwav_skew_cap))
}

/// iv GWAV times clamped skew GWAV
pub fn vol_gwav(
    env: &Env,
    params: &GreekCacheParameters,
    board_id: u32,
    strike_id: u32,
    iv_seconds_ago: u64,
    skew_seconds_ago: u64,
) -> Result<i128, OptionsError> {
    let iv = iv_gwav(env, board_id, iv_seconds_ago)?;
    let skew = skew_gwav(env, params, strike_id, skew_seconds_ago)?;
    Ok(multiply_decimal(env, iv, skew))
}

pub fn observe(env: &Env, key: GwavKey, seconds_agos: &Vec<u64>) -> Result<Vec<i128>, OptionsError> {
    let history = StoredHistory::load(env, key);
    gwav::observe(env, &history, env.ledger().timestamp(), seconds_agos)
}

