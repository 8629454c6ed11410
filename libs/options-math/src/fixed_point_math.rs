use options_types::OptionsError;

// Natural log and exponential for signed fixed-point numbers.
//
// Both functions range-reduce with a power of two, evaluate a rational
// approximation on a binary Q62 value, then rescale into the decimal
// unit. Every intermediate stays inside i128.

const FRAC_BITS: u32 = 62;
const ONE_Q62: i128 = 1 << FRAC_BITS;

/// ln(2) as Q62
const LN2_Q62: i128 = 3_196_577_161_300_663_915;

/// sqrt(2) as Q62
const SQRT2_Q62: i128 = 6_521_908_912_666_391_106;

/// ln(2) scaled by 1e36
const LN2_E36: i128 = 693_147_180_559_945_309_417_232_121_458_176_568;

/// atanh(s)/s ~= P(s^2)/Q(s^2) on |s| <= 3 - 2*sqrt(2), Q62 coefficients
const LN_P: [i128; 5] = [
    4_611_686_018_427_387_904,
    -8_228_694_660_331_221_554,
    4_503_175_759_170_272_894,
    -768_514_968_035_281_578,
    19_733_955_907_077_060,
];
const LN_Q: [i128; 5] = [
    4_611_686_018_427_387_904,
    -9_765_923_333_140_350_856,
    6_836_146_333_198_245_599,
    -1_752_858_034_153_396_307,
    119_513_047_783_186_112,
];

/// exp(r) ~= N(r)/N(-r) on |r| <= ln(2)/2, Q62 coefficients
const EXP_N: [i128; 7] = [
    4_611_686_018_427_387_904,
    2_305_843_009_213_693_952,
    524_055_229_366_748_625,
    69_874_030_582_233_150,
    5_822_835_881_852_763,
    291_141_794_092_638,
    6_931_947_478_396,
];

/// A decimal fixed-point scale: unit = 10^digits = 2^digits * 5^digits
struct Scale {
    digits: u32,
    pow5: i128,
    /// ln(unit) scaled by 1e36
    ln_unit_e36: i128,
    /// 10^(36 - digits)
    e36_divisor: i128,
    /// Smallest input whose exponential does not fit in i128
    exp_max: i128,
    /// Inputs at or below this have an exponential under half a unit
    exp_min: i128,
}

const DECIMAL: Scale = Scale {
    digits: 18,
    pow5: 3_814_697_265_625,
    ln_unit_e36: 41_446_531_673_892_822_312_323_846_184_318_555_737,
    e36_divisor: 1_000_000_000_000_000_000,
    exp_max: 46_583_160_257_220_231_983,
    exp_min: -42_139_678_854_452_767_622,
};

const PRECISE: Scale = Scale {
    digits: 27,
    pow5: 7_450_580_596_923_828_125,
    ln_unit_e36: 62_169_797_510_839_233_468_485_769_276_477_833_605,
    e36_divisor: 1_000_000_000,
    exp_max: 25_859_894_420_273_820_827_502_710_148,
    exp_min: -62_862_944_691_399_178_777_903_001_398,
};

/// Natural log of a 1e18 fixed-point value
pub fn ln(x: i128) -> Result<i128, OptionsError> {
    ln_scaled(x, &DECIMAL)
}

/// Natural log of a 1e27 fixed-point value
pub fn ln_precise(x: i128) -> Result<i128, OptionsError> {
    ln_scaled(x, &PRECISE)
}

/// e^x for a 1e18 fixed-point value
///
/// Returns 0 below about -42.14 and `ExpOverflow` from about 46.58.
pub fn exp(x: i128) -> Result<i128, OptionsError> {
    exp_scaled(x, &DECIMAL)
}

/// e^x for a 1e27 fixed-point value
///
/// Returns 0 below about -62.86 and `ExpOverflow` from about 25.86.
pub fn exp_precise(x: i128) -> Result<i128, OptionsError> {
    exp_scaled(x, &PRECISE)
}

/// Floor of the square root (Newton iteration from above)
pub fn isqrt(x: u128) -> u128 {
    if x < 2 {
        return x;
    }
    let shift = (128 - x.leading_zeros() + 1) / 2;
    let mut y: u128 = 1 << shift;
    loop {
        let z = (y + x / y) >> 1;
        if z >= y {
            return y;
        }
        y = z;
    }
}

/// Square root of a non-negative 1e27 fixed-point value
pub fn sqrt_precise(x: i128) -> Result<i128, OptionsError> {
    if x < 0 {
        return Err(OptionsError::InvalidBlackScholesInput);
    }
    let widened = x
        .checked_mul(1_000_000_000)
        .ok_or(OptionsError::MathOverflow)?;
    Ok(isqrt(widened as u128) as i128 * 1_000_000_000)
}

fn ln_scaled(x: i128, scale: &Scale) -> Result<i128, OptionsError> {
    if x <= 0 {
        return Err(OptionsError::LnOfNonPositive);
    }

    // x = m * 2^k with m in [1/sqrt2, sqrt2] as Q62
    let msb = 127 - x.leading_zeros();
    let mut m = if msb >= FRAC_BITS {
        x >> (msb - FRAC_BITS)
    } else {
        x << (FRAC_BITS - msb)
    };
    let mut k = msb as i128;
    if m > SQRT2_Q62 {
        m >>= 1;
        k += 1;
    }

    // ln(m) = 2 * atanh(s) with s = (m - 1) / (m + 1)
    let s = ((m - ONE_Q62) << FRAC_BITS) / (m + ONE_Q62);
    let z = (s * s) >> FRAC_BITS;
    let ratio = (horner(&LN_P, z) << FRAC_BITS) / horner(&LN_Q, z);
    let ln_m = (2 * s * ratio) >> FRAC_BITS;

    // k * ln2 counts the unit's own binary exponent too, take ln(unit) off
    let whole = (k * LN2_E36 - scale.ln_unit_e36) / scale.e36_divisor;
    let frac = (ln_m * scale.pow5) >> (FRAC_BITS - scale.digits);
    Ok(whole + frac)
}

fn exp_scaled(x: i128, scale: &Scale) -> Result<i128, OptionsError> {
    if x <= scale.exp_min {
        return Ok(0);
    }
    if x >= scale.exp_max {
        return Err(OptionsError::ExpOverflow);
    }

    // x / 10^d as Q62, split to keep the shift in range
    let shift = FRAC_BITS - scale.digits;
    let xq = ((x / scale.pow5) << shift) + (((x % scale.pow5) << shift) / scale.pow5);

    // x = k * ln2 + r with |r| <= ln2 / 2
    let half = LN2_Q62 / 2;
    let k = (xq + if xq >= 0 { half } else { -half }) / LN2_Q62;
    let r = xq - k * LN2_Q62;

    let er = (horner(&EXP_N, r) << FRAC_BITS) / horner(&EXP_N, -r);

    // e^x * 10^d = er * 5^d * 2^(k + d - 62)
    let v = er * scale.pow5;
    let exponent = k + scale.digits as i128 - FRAC_BITS as i128;
    if exponent >= 0 {
        Ok(v << exponent as u32)
    } else {
        Ok(v >> (-exponent) as u32)
    }
}

/// Evaluate a Q62 polynomial with coefficients in ascending order
fn horner(coefficients: &[i128], x: i128) -> i128 {
    let mut acc = coefficients[coefficients.len() - 1];
    for c in coefficients[..coefficients.len() - 1].iter().rev() {
        acc = ((acc * x) >> FRAC_BITS) + c;
    }
    acc
}
