#![no_std]

mod board;
mod greek_cache;
mod gwav_store;
mod liquidation;
mod settlement;
mod storage;
mod trade;

use options_types::{
    Board, BoardGreeks, GreekCacheParameters, GwavKey, LiquidationFees, MarketTotals,
    MinCollateralParameters, NetGreeks, OptionType, OptionsError, PartialCollateralParameters,
    Position, SettlementResult, Strike, StrikeGreeks, TradeResult,
};
use soroban_sdk::{contract, contractimpl, log, Address, Env, Symbol, Vec};
use storage::DataKey;

#[contract]
pub struct OptionMarket;

#[contractimpl]
impl OptionMarket {
    /// Initialize the market with its admin and risk parameters
    pub fn initialize(
        env: Env,
        admin: Address,
        greek_cache_params: GreekCacheParameters,
        min_collat_params: MinCollateralParameters,
        partial_collat_params: PartialCollateralParameters,
    ) -> Result<(), OptionsError> {
        if storage::is_initialized(&env) {
            return Err(OptionsError::AlreadyInitialized);
        }
        greek_cache_params.validate()?;
        min_collat_params.validate()?;
        partial_collat_params.validate()?;

        storage::set_admin(&env, &admin);
        storage::set_greek_cache_params(&env, &greek_cache_params);
        storage::set_min_collat_params(&env, &min_collat_params);
        storage::set_partial_collat_params(&env, &partial_collat_params);
        Ok(())
    }

    // === Admin configuration ===

    pub fn set_greek_cache_params(
        env: Env,
        params: GreekCacheParameters,
    ) -> Result<(), OptionsError> {
        require_admin(&env)?;
        params.validate()?;
        storage::set_greek_cache_params(&env, &params);
        publish_params_updated(&env, "greek_cache");
        Ok(())
    }

    pub fn set_min_collateral_params(
        env: Env,
        params: MinCollateralParameters,
    ) -> Result<(), OptionsError> {
        require_admin(&env)?;
        params.validate()?;
        storage::set_min_collat_params(&env, &params);
        publish_params_updated(&env, "min_collateral");
        Ok(())
    }

    pub fn set_partial_collateral_params(
        env: Env,
        params: PartialCollateralParameters,
    ) -> Result<(), OptionsError> {
        require_admin(&env)?;
        params.validate()?;
        storage::set_partial_collat_params(&env, &params);
        publish_params_updated(&env, "partial_collateral");
        Ok(())
    }

    /// Push the spot price every valuation reads
    pub fn set_spot_price(env: Env, spot: i128) -> Result<(), OptionsError> {
        require_admin(&env)?;
        if spot <= 0 {
            log!(&env, "spot price must be positive", spot);
            return Err(OptionsError::InvalidSpotPrice);
        }
        storage::set_spot_price(&env, spot);
        Ok(())
    }

    pub fn get_spot_price(env: Env) -> Result<i128, OptionsError> {
        storage::get_spot_price(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, OptionsError> {
        storage::get_admin(&env)
    }

    pub fn get_greek_cache_params(env: Env) -> Result<GreekCacheParameters, OptionsError> {
        storage::get_greek_cache_params(&env)
    }

    pub fn get_min_collateral_params(env: Env) -> Result<MinCollateralParameters, OptionsError> {
        storage::get_min_collat_params(&env)
    }

    pub fn get_partial_collateral_params(
        env: Env,
    ) -> Result<PartialCollateralParameters, OptionsError> {
        storage::get_partial_collat_params(&env)
    }

    // === Boards and strikes ===

    /// List a board with one strike per (strike price, skew) pair
    ///
    /// # Returns
    /// The new board id
    pub fn create_option_board(
        env: Env,
        expiry: u64,
        base_iv: i128,
        strike_prices: Vec<i128>,
        skews: Vec<i128>,
        frozen: bool,
    ) -> Result<u32, OptionsError> {
        require_admin(&env)?;
        board::create_board(&env, expiry, base_iv, strike_prices, skews, frozen)
    }

    pub fn add_strike_to_board(
        env: Env,
        board_id: u32,
        strike_price: i128,
        skew: i128,
    ) -> Result<u32, OptionsError> {
        require_admin(&env)?;
        board::add_strike(&env, board_id, strike_price, skew)
    }

    pub fn set_board_frozen(env: Env, board_id: u32, frozen: bool) -> Result<(), OptionsError> {
        require_admin(&env)?;
        board::set_frozen(&env, board_id, frozen)
    }

    /// Only allowed while the board is frozen
    pub fn set_board_base_iv(env: Env, board_id: u32, base_iv: i128) -> Result<(), OptionsError> {
        require_admin(&env)?;
        board::set_base_iv(&env, board_id, base_iv)
    }

    /// Only allowed while the strike's board is frozen
    pub fn set_strike_skew(env: Env, strike_id: u32, skew: i128) -> Result<(), OptionsError> {
        require_admin(&env)?;
        board::set_skew(&env, strike_id, skew)
    }

    pub fn get_board(env: Env, board_id: u32) -> Result<Board, OptionsError> {
        storage::get_board(&env, board_id)
    }

    pub fn get_strike(env: Env, strike_id: u32) -> Result<Strike, OptionsError> {
        storage::get_strike(&env, strike_id)
    }

    /// Boards that are neither expired nor settled
    pub fn get_live_boards(env: Env) -> Vec<u32> {
        board::live_boards(&env)
    }

    pub fn get_board_count(env: Env) -> u32 {
        storage::issued_count(&env, DataKey::NextBoardId)
    }

    // === Greek cache ===

    /// Reprice a board at the current spot and refresh the net greeks
    pub fn update_board_cached_greeks(
        env: Env,
        board_id: u32,
    ) -> Result<BoardGreeks, OptionsError> {
        let board = storage::get_board(&env, board_id)?;
        if board.settled {
            return Err(OptionsError::BoardAlreadySettled);
        }
        greek_cache::refresh_board(&env, &board)
    }

    pub fn get_strike_greeks(env: Env, strike_id: u32) -> Result<StrikeGreeks, OptionsError> {
        storage::get_strike(&env, strike_id)?;
        Ok(storage::get_strike_greeks(&env, strike_id))
    }

    pub fn get_board_greeks(env: Env, board_id: u32) -> Result<BoardGreeks, OptionsError> {
        storage::get_board(&env, board_id)?;
        Ok(storage::get_board_greeks(&env, board_id))
    }

    pub fn get_net_greeks(env: Env) -> NetGreeks {
        storage::get_net_greeks(&env)
    }

    // === GWAV ===

    pub fn get_iv_gwav(env: Env, board_id: u32, seconds_ago: u64) -> Result<i128, OptionsError> {
        storage::get_board(&env, board_id)?;
        gwav_store::iv_gwav(&env, board_id, seconds_ago)
    }

    /// Skew GWAV clamped to the configured floor and cap
    pub fn get_skew_gwav(env: Env, strike_id: u32, seconds_ago: u64) -> Result<i128, OptionsError> {
        storage::get_strike(&env, strike_id)?;
        let params = storage::get_greek_cache_params(&env)?;
        gwav_store::skew_gwav(&env, &params, strike_id, seconds_ago)
    }

    pub fn get_vol_gwav(
        env: Env,
        strike_id: u32,
        iv_seconds_ago: u64,
        skew_seconds_ago: u64,
    ) -> Result<i128, OptionsError> {
        let strike = storage::get_strike(&env, strike_id)?;
        let params = storage::get_greek_cache_params(&env)?;
        gwav_store::vol_gwav(
            &env,
            &params,
            strike.board_id,
            strike_id,
            iv_seconds_ago,
            skew_seconds_ago,
        )
    }

    /// Raw accumulators of a history at each offset
    pub fn observe_gwav(
        env: Env,
        key: GwavKey,
        seconds_agos: Vec<u64>,
    ) -> Result<Vec<i128>, OptionsError> {
        gwav_store::observe(&env, key, &seconds_agos)
    }

    // === Risk views ===

    pub fn get_shock_vol(env: Env, time_to_maturity: u64) -> Result<i128, OptionsError> {
        let params = storage::get_min_collat_params(&env)?;
        Ok(options_math::shock_vol(&params, time_to_maturity))
    }

    /// Minimum collateral of a short at the stored spot
    pub fn get_min_collateral(
        env: Env,
        option_type: OptionType,
        strike_price: i128,
        expiry: u64,
        amount: i128,
    ) -> Result<i128, OptionsError> {
        let rate = storage::get_greek_cache_params(&env)?.rate_and_carry;
        options_math::min_collateral(
            &env,
            &storage::get_min_collat_params(&env)?,
            rate,
            option_type,
            strike_price,
            expiry.saturating_sub(env.ledger().timestamp()),
            storage::get_spot_price(&env)?,
            amount,
        )
    }

    pub fn get_liquidation_fees(
        env: Env,
        premium: i128,
        collateral: i128,
        min_fee: i128,
        insolvency_multiplier: i128,
    ) -> Result<LiquidationFees, OptionsError> {
        let params = storage::get_partial_collat_params(&env)?;
        Ok(options_math::get_liquidation_fees(
            &env,
            &params,
            premium,
            collateral,
            min_fee,
            insolvency_multiplier,
        ))
    }

    // === Positions ===

    /// Open a position on a live, unfrozen board
    ///
    /// # Arguments
    /// * `collateral` - Must be 0 for longs, at least the minimum for shorts
    pub fn open_position(
        env: Env,
        trader: Address,
        strike_id: u32,
        option_type: OptionType,
        amount: i128,
        collateral: i128,
    ) -> Result<TradeResult, OptionsError> {
        trader.require_auth();
        trade::open(&env, trader, strike_id, option_type, amount, collateral)
    }

    /// Close part or all of a position
    pub fn close_position(
        env: Env,
        trader: Address,
        position_id: u32,
        amount: i128,
        set_collateral_to: i128,
    ) -> Result<TradeResult, OptionsError> {
        trader.require_auth();
        trade::close(&env, trader, position_id, amount, set_collateral_to)
    }

    pub fn add_collateral(
        env: Env,
        from: Address,
        position_id: u32,
        amount: i128,
    ) -> Result<i128, OptionsError> {
        from.require_auth();
        trade::add_collateral(&env, position_id, amount)
    }

    pub fn can_liquidate(env: Env, position_id: u32) -> Result<bool, OptionsError> {
        let position = storage::get_position(&env, position_id)?;
        liquidation::is_liquidatable(&env, &position)
    }

    /// Premium the position would owe if liquidated now
    pub fn get_liquidation_premium(env: Env, position_id: u32) -> Result<i128, OptionsError> {
        let position = storage::get_position(&env, position_id)?;
        liquidation::premium_owed(&env, &position)
    }

    pub fn liquidate_position(
        env: Env,
        liquidator: Address,
        position_id: u32,
    ) -> Result<LiquidationFees, OptionsError> {
        liquidator.require_auth();
        liquidation::liquidate(&env, liquidator, position_id)
    }

    pub fn merge_positions(
        env: Env,
        owner: Address,
        position_ids: Vec<u32>,
    ) -> Result<u32, OptionsError> {
        owner.require_auth();
        trade::merge(&env, owner, position_ids)
    }

    // === Settlement ===

    /// Record the current spot as the expiry price of an expired board
    pub fn settle_expired_board(env: Env, board_id: u32) -> Result<i128, OptionsError> {
        require_admin(&env)?;
        settlement::settle_board(&env, board_id)
    }

    pub fn settle_position(env: Env, position_id: u32) -> Result<SettlementResult, OptionsError> {
        settlement::settle_position(&env, position_id)
    }

    // === Position views ===

    pub fn get_position(env: Env, position_id: u32) -> Result<Position, OptionsError> {
        storage::get_position(&env, position_id)
    }

    /// Open position ids of `owner`
    /// Maximum limit is 50 to stay within Soroban's read entry limits
    pub fn get_owner_positions(env: Env, owner: Address, start: u32, limit: u32) -> Vec<u32> {
        storage::owner_positions(&env, &owner, start, limit)
    }

    pub fn get_owner_position_count(env: Env, owner: Address) -> u32 {
        storage::owner_position_count(&env, &owner)
    }

    pub fn get_position_count(env: Env) -> u32 {
        storage::issued_count(&env, DataKey::NextPositionId)
    }

    pub fn get_market_totals(env: Env) -> MarketTotals {
        storage::get_totals(&env)
    }
}

// === Helper Functions ===

fn require_admin(env: &Env) -> Result<Address, OptionsError> {
    let admin = storage::get_admin(env)?;
    admin.require_auth();
    Ok(admin)
}

fn publish_params_updated(env: &Env, which: &str) {
    env.events().publish(
        (Symbol::new(env, "params_updated"),),
        Symbol::new(env, which),
    );
}
