use options_types::{
    BlackScholesInputs, NetGreeks, OptionType, OptionsError, Strike, StrikeGreeks,
};
use soroban_sdk::Env;

use crate::black_scholes::prices_delta_std_vega;
use crate::decimal_math::multiply_decimal;

/// Price and greeks of one strike at board iv * skew
pub fn strike_greeks(
    env: &Env,
    strike: &Strike,
    board_iv: i128,
    time_to_expiry: u64,
    spot: i128,
    rate: i128,
    now: u64,
) -> Result<StrikeGreeks, OptionsError> {
    let volatility = multiply_decimal(env, board_iv, strike.skew);
    let pricing = prices_delta_std_vega(
        env,
        &BlackScholesInputs {
            time_to_expiry_sec: time_to_expiry,
            volatility,
            spot,
            strike_price: strike.strike_price,
            rate,
        },
    )?;
    Ok(StrikeGreeks {
        strike_id: strike.id,
        volatility,
        call_price: pricing.call_price,
        put_price: pricing.put_price,
        call_delta: pricing.call_delta,
        put_delta: pricing.put_delta,
        std_vega: pricing.std_vega,
        updated_at: now,
    })
}

/// Premium of `amount` options of the given type
pub fn position_value(
    env: &Env,
    option_type: OptionType,
    call_price: i128,
    put_price: i128,
    amount: i128,
) -> i128 {
    let price = if option_type.is_call() {
        call_price
    } else {
        put_price
    };
    multiply_decimal(env, price, amount)
}

/// Net greeks contributed by a strike's open interest
pub fn strike_net_greeks(env: &Env, strike: &Strike, greeks: &StrikeGreeks) -> NetGreeks {
    let calls = strike.call_exposure();
    let puts = strike.put_exposure();
    NetGreeks {
        net_delta: multiply_decimal(env, greeks.call_delta, calls)
            + multiply_decimal(env, greeks.put_delta, puts),
        net_std_vega: multiply_decimal(env, greeks.std_vega, calls + puts),
        net_option_value: multiply_decimal(env, greeks.call_price, calls)
            + multiply_decimal(env, greeks.put_price, puts),
    }
}

pub fn add_net_greeks(a: &NetGreeks, b: &NetGreeks) -> NetGreeks {
    NetGreeks {
        net_delta: a.net_delta + b.net_delta,
        net_std_vega: a.net_std_vega + b.net_std_vega,
        net_option_value: a.net_option_value + b.net_option_value,
    }
}

pub fn sub_net_greeks(a: &NetGreeks, b: &NetGreeks) -> NetGreeks {
    NetGreeks {
        net_delta: a.net_delta - b.net_delta,
        net_std_vega: a.net_std_vega - b.net_std_vega,
        net_option_value: a.net_option_value - b.net_option_value,
    }
}

/// Add (or with a negative delta remove) open interest on a strike
pub fn apply_exposure(
    strike: &mut Strike,
    option_type: OptionType,
    delta: i128,
) -> Result<(), OptionsError> {
    let slot = match option_type {
        OptionType::LongCall => &mut strike.long_call,
        OptionType::LongPut => &mut strike.long_put,
        OptionType::ShortCallBase => &mut strike.short_call_base,
        OptionType::ShortCallQuote => &mut strike.short_call_quote,
        OptionType::ShortPutQuote => &mut strike.short_put,
    };
    let updated = *slot + delta;
    if updated < 0 {
        return Err(OptionsError::InvalidAmount);
    }
    *slot = updated;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::exposure_non_negative;
    use options_types::DECIMAL_UNIT;
    use soroban_sdk::Env;

    const UNIT: i128 = DECIMAL_UNIT;

    fn strike() -> Strike {
        let mut strike = Strike::new(3, 1, 2_000 * UNIT, UNIT);
        strike.long_call = 10 * UNIT;
        strike.short_call_base = 2 * UNIT;
        strike.short_call_quote = 3 * UNIT;
        strike.long_put = UNIT;
        strike.short_put = 4 * UNIT;
        strike
    }

    #[test]
    fn test_strike_greeks_use_skewed_vol() {
        let env = Env::default();
        let mut s = strike();
        s.skew = UNIT / 2;
        let greeks = strike_greeks(&env, &s, 16 * UNIT / 10, 7 * 86_400, 2_000 * UNIT, 0, 42).unwrap();
        assert_eq!(greeks.volatility, 8 * UNIT / 10);
        assert_eq!(greeks.strike_id, 3);
        assert_eq!(greeks.updated_at, 42);
        // 7 day at-the-money at 80%
        assert!((greeks.call_price - 88_350_818_396_637_589_819).abs() < 1_000_000_000);
        assert_eq!(greeks.call_delta - greeks.put_delta, UNIT);
    }

    #[test]
    fn test_net_greeks_follow_exposure() {
        let env = Env::default();
        let s = strike();
        let greeks = StrikeGreeks {
            strike_id: 3,
            volatility: UNIT,
            call_price: 100 * UNIT,
            put_price: 50 * UNIT,
            call_delta: UNIT / 2,
            put_delta: -UNIT / 2,
            std_vega: 2 * UNIT,
            updated_at: 0,
        };
        let net = strike_net_greeks(&env, &s, &greeks);
        // calls: 10 - 2 - 3 = 5, puts: 1 - 4 = -3
        assert_eq!(net.net_delta, 5 * UNIT / 2 + 3 * UNIT / 2);
        assert_eq!(net.net_std_vega, 4 * UNIT);
        assert_eq!(net.net_option_value, 500 * UNIT - 150 * UNIT);

        let doubled = add_net_greeks(&net, &net);
        assert_eq!(doubled.net_delta, 8 * UNIT);
        assert_eq!(sub_net_greeks(&doubled, &net), net);
    }

    #[test]
    fn test_position_value_by_side() {
        let env = Env::default();
        assert_eq!(
            position_value(&env, OptionType::ShortCallBase, 100 * UNIT, 50 * UNIT, 2 * UNIT),
            200 * UNIT
        );
        assert_eq!(
            position_value(&env, OptionType::LongPut, 100 * UNIT, 50 * UNIT, 2 * UNIT),
            100 * UNIT
        );
    }

    #[test]
    fn test_apply_exposure() {
        let mut s = strike();
        apply_exposure(&mut s, OptionType::ShortPutQuote, 2 * UNIT).unwrap();
        assert_eq!(s.short_put, 6 * UNIT);
        apply_exposure(&mut s, OptionType::LongCall, -10 * UNIT).unwrap();
        assert_eq!(s.long_call, 0);
        assert_eq!(
            apply_exposure(&mut s, OptionType::LongPut, -2 * UNIT),
            Err(OptionsError::InvalidAmount)
        );
        assert_eq!(s.long_put, UNIT);
        assert!(exposure_non_negative(&s));
    }
}
