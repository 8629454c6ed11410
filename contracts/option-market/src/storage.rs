use options_types::{
    Board, BoardGreeks, GreekCacheParameters, GwavKey, MarketTotals, MinCollateralParameters,
    NetGreeks, Observation, OptionsError, PartialCollateralParameters, Position, Strike,
    StrikeGreeks, MAX_PAGE_SIZE,
};
use soroban_sdk::{contracttype, log, Address, Env, Vec};

// ============================================================================
// SOROBAN RESOURCE LIMITS - constraints that shape the market's storage:
// ============================================================================
// - Ledger entry size: 128 KiB max per entry
// - Read entries per tx: 100 entries / 200 KB
// - Write entries per tx: 50 entries / 132 KB
//
// Storage design considerations:
// - Boards, strikes, cached greeks and positions are separate entries
// - A full board refresh prices and writes every strike, so
//   `max_strikes_per_board` is bounded by `MAX_STRIKES_PER_BOARD`
// - Trades and liquidations reprice only the strike they touch
// - GWAV observations are one entry each, read by binary search
// - Owner positions use count + indexed entries with swap-and-pop removal
// ============================================================================

/// Storage keys for the market contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Administrator (Instance storage)
    Admin,
    /// Latest spot price pushed by the admin (Instance storage)
    SpotPrice,
    GreekCacheParams,
    MinCollatParams,
    PartialCollatParams,
    /// Id counters (Instance storage)
    NextBoardId,
    NextStrikeId,
    NextPositionId,
    /// Boards not yet settled (Instance storage)
    LiveBoards,
    /// Sum of every board's cached net greeks (Instance storage)
    NetGreeks,
    /// Liquidation and settlement totals (Instance storage)
    Totals,
    /// board id -> Board (Persistent storage)
    Board(u32),
    /// strike id -> Strike (Persistent storage)
    Strike(u32),
    /// strike id -> StrikeGreeks (Persistent storage)
    StrikeGreeks(u32),
    /// board id -> BoardGreeks (Persistent storage)
    BoardGreeks(u32),
    /// Observation count of a GWAV history (Persistent storage)
    GwavCount(GwavKey),
    /// GWAV history entry (Persistent storage)
    GwavObservation(GwavKey, u32),
    /// position id -> Position (Persistent storage)
    Position(u32),
    /// Owner -> number of open positions
    OwnerPositionCount(Address),
    /// Owner -> index -> position id
    OwnerPositionAt(Address, u32),
    /// position id -> index in its owner's list
    PositionIndex(u32),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

fn get_persistent<T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>>(
    env: &Env,
    key: &DataKey,
) -> Option<T> {
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        extend_persistent_ttl(env, key);
    }
    value
}

fn set_persistent<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(
    env: &Env,
    key: &DataKey,
    value: &T,
) {
    env.storage().persistent().set(key, value);
    extend_persistent_ttl(env, key);
}

// === Admin and config ===

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, OptionsError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(OptionsError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    extend_instance_ttl(env);
}

pub fn get_spot_price(env: &Env) -> Result<i128, OptionsError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::SpotPrice)
        .ok_or(OptionsError::SpotPriceNotSet)
}

pub fn set_spot_price(env: &Env, spot: i128) {
    env.storage().instance().set(&DataKey::SpotPrice, &spot);
    extend_instance_ttl(env);
}

pub fn get_greek_cache_params(env: &Env) -> Result<GreekCacheParameters, OptionsError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::GreekCacheParams)
        .ok_or(OptionsError::NotInitialized)
}

pub fn set_greek_cache_params(env: &Env, params: &GreekCacheParameters) {
    env.storage().instance().set(&DataKey::GreekCacheParams, params);
    extend_instance_ttl(env);
}

pub fn get_min_collat_params(env: &Env) -> Result<MinCollateralParameters, OptionsError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::MinCollatParams)
        .ok_or(OptionsError::NotInitialized)
}

pub fn set_min_collat_params(env: &Env, params: &MinCollateralParameters) {
    env.storage().instance().set(&DataKey::MinCollatParams, params);
    extend_instance_ttl(env);
}

pub fn get_partial_collat_params(env: &Env) -> Result<PartialCollateralParameters, OptionsError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::PartialCollatParams)
        .ok_or(OptionsError::NotInitialized)
}

pub fn set_partial_collat_params(env: &Env, params: &PartialCollateralParameters) {
    env.storage().instance().set(&DataKey::PartialCollatParams, params);
    extend_instance_ttl(env);
}

// === Id counters ===

/// Hand out the next id for `key`, starting from 1
pub fn next_id(env: &Env, key: DataKey) -> u32 {
    let id: u32 = env.storage().instance().get(&key).unwrap_or(1);
    env.storage().instance().set(&key, &(id + 1));
    extend_instance_ttl(env);
    id
}

/// Number of ids handed out for `key`
pub fn issued_count(env: &Env, key: DataKey) -> u32 {
    let next: u32 = env.storage().instance().get(&key).unwrap_or(1);
    next - 1
}

// === Boards and strikes ===

pub fn get_board(env: &Env, board_id: u32) -> Result<Board, OptionsError> {
    get_persistent(env, &DataKey::Board(board_id)).ok_or_else(|| {
        log!(env, "board not found", board_id);
        OptionsError::BoardNotFound
    })
}

pub fn set_board(env: &Env, board: &Board) {
    set_persistent(env, &DataKey::Board(board.id), board);
}

pub fn get_strike(env: &Env, strike_id: u32) -> Result<Strike, OptionsError> {
    get_persistent(env, &DataKey::Strike(strike_id)).ok_or_else(|| {
        log!(env, "strike not found", strike_id);
        OptionsError::StrikeNotFound
    })
}

pub fn set_strike(env: &Env, strike: &Strike) {
    set_persistent(env, &DataKey::Strike(strike.id), strike);
}

pub fn get_live_boards(env: &Env) -> Vec<u32> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::LiveBoards)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_live_boards(env: &Env, boards: &Vec<u32>) {
    env.storage().instance().set(&DataKey::LiveBoards, boards);
    extend_instance_ttl(env);
}

// === Greek cache ===

pub fn get_strike_greeks(env: &Env, strike_id: u32) -> StrikeGreeks {
    get_persistent(env, &DataKey::StrikeGreeks(strike_id)).unwrap_or_default()
}

pub fn set_strike_greeks(env: &Env, greeks: &StrikeGreeks) {
    set_persistent(env, &DataKey::StrikeGreeks(greeks.strike_id), greeks);
}

pub fn get_board_greeks(env: &Env, board_id: u32) -> BoardGreeks {
    get_persistent(env, &DataKey::BoardGreeks(board_id)).unwrap_or(BoardGreeks {
        board_id,
        ..BoardGreeks::default()
    })
}

pub fn set_board_greeks(env: &Env, greeks: &BoardGreeks) {
    set_persistent(env, &DataKey::BoardGreeks(greeks.board_id), greeks);
}

pub fn get_net_greeks(env: &Env) -> NetGreeks {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::NetGreeks)
        .unwrap_or_default()
}

pub fn set_net_greeks(env: &Env, greeks: &NetGreeks) {
    env.storage().instance().set(&DataKey::NetGreeks, greeks);
    extend_instance_ttl(env);
}

// === GWAV histories ===

pub fn get_gwav_count(env: &Env, key: &GwavKey) -> u32 {
    get_persistent(env, &DataKey::GwavCount(key.clone())).unwrap_or(0)
}

pub fn set_gwav_count(env: &Env, key: &GwavKey, count: u32) {
    set_persistent(env, &DataKey::GwavCount(key.clone()), &count);
}

pub fn get_gwav_observation(env: &Env, key: &GwavKey, index: u32) -> Option<Observation> {
    get_persistent(env, &DataKey::GwavObservation(key.clone(), index))
}

pub fn set_gwav_observation(env: &Env, key: &GwavKey, index: u32, observation: &Observation) {
    set_persistent(env, &DataKey::GwavObservation(key.clone(), index), observation);
}

// === Positions ===

pub fn get_position(env: &Env, position_id: u32) -> Result<Position, OptionsError> {
    get_persistent(env, &DataKey::Position(position_id)).ok_or_else(|| {
        log!(env, "position not found", position_id);
        OptionsError::PositionNotFound
    })
}

pub fn set_position(env: &Env, position: &Position) {
    set_persistent(env, &DataKey::Position(position.id), position);
}

pub fn get_totals(env: &Env) -> MarketTotals {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Totals)
        .unwrap_or_default()
}

pub fn set_totals(env: &Env, totals: &MarketTotals) {
    env.storage().instance().set(&DataKey::Totals, totals);
    extend_instance_ttl(env);
}

// === Owner index ===

pub fn owner_position_count(env: &Env, owner: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::OwnerPositionCount(owner.clone()))
        .unwrap_or(0)
}

pub fn add_position_to_owner(env: &Env, owner: &Address, position_id: u32) {
    let count = owner_position_count(env, owner);
    set_persistent(env, &DataKey::OwnerPositionAt(owner.clone(), count), &position_id);
    set_persistent(env, &DataKey::PositionIndex(position_id), &count);
    set_persistent(env, &DataKey::OwnerPositionCount(owner.clone()), &(count + 1));
}

/// Swap-and-pop removal from the owner's list
pub fn remove_position_from_owner(env: &Env, owner: &Address, position_id: u32) {
    let count = owner_position_count(env, owner);
    let index: Option<u32> = env
        .storage()
        .persistent()
        .get(&DataKey::PositionIndex(position_id));
    let index = match index {
        Some(index) if count > 0 => index,
        _ => return,
    };

    let last_index = count - 1;
    if index != last_index {
        let last_id: Option<u32> = env
            .storage()
            .persistent()
            .get(&DataKey::OwnerPositionAt(owner.clone(), last_index));
        if let Some(last_id) = last_id {
            set_persistent(env, &DataKey::OwnerPositionAt(owner.clone(), index), &last_id);
            set_persistent(env, &DataKey::PositionIndex(last_id), &index);
        }
    }

    let storage = env.storage().persistent();
    storage.remove(&DataKey::OwnerPositionAt(owner.clone(), last_index));
    storage.remove(&DataKey::PositionIndex(position_id));
    if last_index > 0 {
        set_persistent(env, &DataKey::OwnerPositionCount(owner.clone()), &last_index);
    } else {
        storage.remove(&DataKey::OwnerPositionCount(owner.clone()));
    }
}

/// Page through an owner's open positions, at most `MAX_PAGE_SIZE` at a time
pub fn owner_positions(env: &Env, owner: &Address, start: u32, limit: u32) -> Vec<u32> {
    let limit = limit.min(MAX_PAGE_SIZE);
    let count = owner_position_count(env, owner);
    let end = start.saturating_add(limit).min(count);

    let mut positions = Vec::new(env);
    for i in start..end {
        let id: Option<u32> = env
            .storage()
            .persistent()
            .get(&DataKey::OwnerPositionAt(owner.clone(), i));
        if let Some(id) = id {
            positions.push_back(id);
        }
    }
    positions
}
