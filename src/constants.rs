/// Decimal precision for monetary and percentage outputs
pub const DECIMAL_PRECISION: u32 = 8;

/// Quantity threshold below which a position is considered closed
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

/// Default backward search window for missing closing prices (calendar days)
pub const DEFAULT_PRICE_FALLBACK_DAYS: i64 = 5;

/// Default backward search window for missing FX rates (calendar days)
pub const DEFAULT_FX_FALLBACK_DAYS: i64 = 7;

/// Trading days per year used for annualizing daily statistics
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Calendar days per year used by CAGR and XIRR day-count fractions
pub const DAYS_PER_YEAR: i64 = 365;

/// Default time-to-live for cached analytics results (seconds)
pub const DEFAULT_ANALYTICS_CACHE_TTL_SECS: u64 = 300;

/// Default confidence level for historical Value-at-Risk
pub const DEFAULT_VAR_CONFIDENCE: &str = "0.95";

/// Default annual risk-free rate when the caller does not supply one
pub const DEFAULT_RISK_FREE_RATE: &str = "0.0";

/// Number of largest drawdown periods retained by the risk calculator
pub const MAX_DRAWDOWN_PERIODS: usize = 5;

/// XIRR Newton-Raphson solver bounds
pub const XIRR_INITIAL_GUESS: f64 = 0.1;
pub const XIRR_MAX_ITERATIONS: u32 = 100;
pub const XIRR_TOLERANCE: f64 = 1e-7;
pub const XIRR_DERIVATIVE_FLOOR: f64 = 1e-10;
