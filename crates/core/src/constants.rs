/// Maximum length of portfolio and watchlist names
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length of a portfolio description
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Maximum length of position notes
pub const MAX_NOTES_LENGTH: usize = 500;

/// Upper bound for a position's purchase price
pub const MAX_PURCHASE_PRICE: i64 = 100_000;

/// Upper bound for a position's share count
pub const MAX_SHARES: i64 = 1_000_000_000;

/// Purchase dates older than this are rejected
pub const MAX_PURCHASE_AGE_YEARS: i32 = 50;

/// Watchlists a single user may own
pub const MAX_WATCHLISTS_PER_USER: usize = 10;

/// Symbols a single watchlist may hold
pub const MAX_WATCHLIST_SYMBOLS: usize = 50;

/// Symbols in a comparison selection
pub const MAX_COMPARISON_SYMBOLS: usize = 4;

/// Minimum password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Allocation chart colours, assigned by index and wrapping
pub const ALLOCATION_PALETTE: [&str; 10] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D", "#FFC658", "#FF6B6B",
    "#4ECDC4", "#45B7D1",
];

/// Comparison series colours, one per selection slot
pub const COMPARISON_PALETTE: [&str; MAX_COMPARISON_SYMBOLS] =
    ["#3B82F6", "#10B981", "#F59E0B", "#EF4444"];
