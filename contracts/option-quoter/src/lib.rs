#![no_std]

use options_math::{
    gamma, get_liquidation_fees, liquidation_terms, min_collateral, multiply_decimal,
    prices_delta_std_vega,
};
use options_types::{
    BlackScholesInputs, Board, GreekCacheParameters, LiquidationFees, MinCollateralParameters,
    OptionType, OptionsError, PartialCollateralParameters, Position, Strike,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, Address, Env, IntoVal, Symbol, TryFromVal, Val,
    Vec,
};

#[contract]
pub struct OptionQuoter;

/// Storage keys
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Market,
}

/// Price and risk of opening a position
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeQuote {
    pub strike_id: u32,
    pub option_type: OptionType,
    pub amount: i128,
    /// Board iv times strike skew
    pub volatility: i128,
    pub premium: i128,
    /// Zero for longs
    pub min_collateral: i128,
    /// Per option delta of the call or put traded
    pub delta: i128,
    pub std_vega: i128,
    pub gamma: i128,
}

/// What liquidating a position would do right now
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidationQuote {
    pub position_id: u32,
    pub can_liquidate: bool,
    pub min_collateral: i128,
    /// Premium owed at the GWAV volatility (quote)
    pub premium_owed: i128,
    pub fees: LiquidationFees,
}

#[contractimpl]
impl OptionQuoter {
    /// Initialize quoter with the market it reads from
    pub fn initialize(env: Env, market: Address) -> Result<(), OptionsError> {
        if env.storage().instance().has(&DataKey::Market) {
            return Err(OptionsError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Market, &market);
        Ok(())
    }

    /// Quote opening `amount` options without touching the market
    pub fn quote_open(
        env: Env,
        strike_id: u32,
        option_type: OptionType,
        amount: i128,
    ) -> Result<TradeQuote, OptionsError> {
        if amount <= 0 {
            log!(&env, "quote amount must be positive", amount);
            return Err(OptionsError::InvalidAmount);
        }
        let market = get_market(&env)?;
        let strike = get_strike(&env, &market, strike_id)?;
        let board = get_board(&env, &market, strike.board_id)?;
        let spot = get_spot_price(&env, &market)?;
        let rate = get_greek_cache_params(&env, &market)?.rate_and_carry;
        let time_to_expiry = board.time_to_expiry(env.ledger().timestamp());

        let inputs = BlackScholesInputs {
            time_to_expiry_sec: time_to_expiry,
            volatility: multiply_decimal(&env, board.iv, strike.skew),
            spot,
            strike_price: strike.strike_price,
            rate,
        };
        let pricing = prices_delta_std_vega(&env, &inputs)?;
        let (price, delta) = if option_type.is_call() {
            (pricing.call_price, pricing.call_delta)
        } else {
            (pricing.put_price, pricing.put_delta)
        };

        let min_collateral = if option_type.is_short() {
            min_collateral(
                &env,
                &get_min_collateral_params(&env, &market)?,
                rate,
                option_type,
                strike.strike_price,
                time_to_expiry,
                spot,
                amount,
            )?
        } else {
            0
        };

        Ok(TradeQuote {
            strike_id,
            option_type,
            amount,
            volatility: inputs.volatility,
            premium: multiply_decimal(&env, price, amount),
            min_collateral,
            delta,
            std_vega: pricing.std_vega,
            gamma: gamma(&env, &inputs)?,
        })
    }

    /// Quote liquidating a position at the current spot
    pub fn quote_liquidation(env: Env, position_id: u32) -> Result<LiquidationQuote, OptionsError> {
        let market = get_market(&env)?;
        let position = get_position(&env, &market, position_id)?;
        if position.option_type.is_long() {
            log!(&env, "only shorts can be liquidated", position_id);
            return Err(OptionsError::NotShortPosition);
        }

        let strike = get_strike(&env, &market, position.strike_id)?;
        let board = get_board(&env, &market, strike.board_id)?;
        let spot = get_spot_price(&env, &market)?;
        let min_collateral = min_collateral(
            &env,
            &get_min_collateral_params(&env, &market)?,
            get_greek_cache_params(&env, &market)?.rate_and_carry,
            position.option_type,
            strike.strike_price,
            board.time_to_expiry(env.ledger().timestamp()),
            spot,
            position.amount,
        )?;

        let premium_owed: i128 = call_market(
            &env,
            &market,
            "get_liquidation_premium",
            (position_id,).into_val(&env),
        )?;
        let params = get_partial_collateral_params(&env, &market)?;
        let terms = liquidation_terms(
            &env,
            position.option_type,
            premium_owed,
            params.min_liquidation_fee,
            spot,
        );

        Ok(LiquidationQuote {
            position_id,
            can_liquidate: can_liquidate(&env, &market, position_id)?,
            min_collateral,
            premium_owed,
            fees: get_liquidation_fees(
                &env,
                &params,
                terms.premium,
                position.collateral,
                terms.min_fee,
                terms.insolvency_multiplier,
            ),
        })
    }

    /// Get market address
    pub fn get_market(env: Env) -> Result<Address, OptionsError> {
        get_market(&env)
    }
}

fn get_market(env: &Env) -> Result<Address, OptionsError> {
    env.storage()
        .instance()
        .get(&DataKey::Market)
        .ok_or(OptionsError::NotInitialized)
}

/// Call a market view. Errors the market returns pass through as they are.
fn call_market<T>(
    env: &Env,
    market: &Address,
    func: &str,
    args: Vec<Val>,
) -> Result<T, OptionsError>
where
    T: TryFromVal<Env, Val>,
{
    match env.try_invoke_contract::<T, OptionsError>(market, &Symbol::new(env, func), args) {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(error)) => Err(error),
        _ => {
            log!(env, "market call failed", Symbol::new(env, func));
            Err(OptionsError::MarketCallFailed)
        }
    }
}

fn get_strike(env: &Env, market: &Address, strike_id: u32) -> Result<Strike, OptionsError> {
    call_market(env, market, "get_strike", (strike_id,).into_val(env))
}

fn get_board(env: &Env, market: &Address, board_id: u32) -> Result<Board, OptionsError> {
    call_market(env, market, "get_board", (board_id,).into_val(env))
}

fn get_position(env: &Env, market: &Address, position_id: u32) -> Result<Position, OptionsError> {
    call_market(env, market, "get_position", (position_id,).into_val(env))
}

fn get_spot_price(env: &Env, market: &Address) -> Result<i128, OptionsError> {
    call_market(env, market, "get_spot_price", ().into_val(env))
}

fn can_liquidate(env: &Env, market: &Address, position_id: u32) -> Result<bool, OptionsError> {
    call_market(env, market, "can_liquidate", (position_id,).into_val(env))
}

fn get_greek_cache_params(
    env: &Env,
    market: &Address,
) -> Result<GreekCacheParameters, OptionsError> {
    call_market(env, market, "get_greek_cache_params", ().into_val(env))
}

fn get_min_collateral_params(
    env: &Env,
    market: &Address,
) -> Result<MinCollateralParameters, OptionsError> {
    call_market(env, market, "get_min_collateral_params", ().into_val(env))
}

fn get_partial_collateral_params(
    env: &Env,
    market: &Address,
) -> Result<PartialCollateralParameters, OptionsError> {
    call_market(env, market, "get_partial_collateral_params", ().into_val(env))
}
