//! Symbol classification for the mainland exchanges.
//!
//! Board membership is inferred from the exchange-prefixed ticker
//! (e.g. "sh600000", "sz300750") and drives lot-sizing policy: which
//! boards a sizer may allocate to, and the minimum board lot per venue.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Exchange board a symbol trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolType {
    /// Beijing Stock Exchange (bjxxxxxx).
    BseMain,
    /// Shanghai main board (sh60xxxx).
    SseMain,
    /// Shanghai STAR market (sh68xxxx).
    SseStar,
    /// Shenzhen main board (sz00xxxx).
    SzseMain,
    /// Shenzhen ChiNext (sz30xxxx).
    SzseChinext,
}

impl SymbolType {
    /// Classify a ticker by its exchange prefix.
    pub fn classify(symbol: &str) -> Result<SymbolType> {
        if symbol.starts_with("bj") {
            return Ok(SymbolType::BseMain);
        }
        if symbol.starts_with("sh") {
            return Ok(if symbol.starts_with("sh68") {
                SymbolType::SseStar
            } else {
                SymbolType::SseMain
            });
        }
        if symbol.starts_with("sz") {
            return Ok(if symbol.starts_with("sz0") {
                SymbolType::SzseMain
            } else {
                SymbolType::SzseChinext
            });
        }
        Err(Error::config(format!("unknown symbol: {symbol}")))
    }

    /// Stable integer code matching the upstream data files.
    #[inline]
    pub fn code(self) -> i16 {
        match self {
            SymbolType::BseMain => 0,
            SymbolType::SseMain => 1,
            SymbolType::SseStar => 2,
            SymbolType::SzseMain => 3,
            SymbolType::SzseChinext => 4,
        }
    }

    /// Minimum first-buy share count on this board.
    ///
    /// STAR-market orders start at 200 shares; every other board trades in
    /// lots of 100.
    #[inline]
    pub fn min_board_lot(self) -> u32 {
        match self {
            SymbolType::SseStar => 200,
            _ => 100,
        }
    }
}

/// Classify a full universe of tickers, failing on the first unknown one.
pub fn classify_all(symbols: &[&str]) -> Result<Vec<SymbolType>> {
    symbols.iter().map(|s| SymbolType::classify(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(SymbolType::classify("bj430047").unwrap(), SymbolType::BseMain);
        assert_eq!(SymbolType::classify("sh600000").unwrap(), SymbolType::SseMain);
        assert_eq!(SymbolType::classify("sh688981").unwrap(), SymbolType::SseStar);
        assert_eq!(SymbolType::classify("sz000001").unwrap(), SymbolType::SzseMain);
        assert_eq!(SymbolType::classify("sz300750").unwrap(), SymbolType::SzseChinext);
    }

    #[test]
    fn test_classify_unknown_fails() {
        assert!(SymbolType::classify("hk00700").is_err());
        assert!(SymbolType::classify("").is_err());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(SymbolType::BseMain.code(), 0);
        assert_eq!(SymbolType::SseMain.code(), 1);
        assert_eq!(SymbolType::SseStar.code(), 2);
        assert_eq!(SymbolType::SzseMain.code(), 3);
        assert_eq!(SymbolType::SzseChinext.code(), 4);
    }

    #[test]
    fn test_board_lots() {
        assert_eq!(SymbolType::SseStar.min_board_lot(), 200);
        assert_eq!(SymbolType::SzseMain.min_board_lot(), 100);
    }

    #[test]
    fn test_classify_all() {
        let types = classify_all(&["sh600000", "sz300750"]).unwrap();
        assert_eq!(types, vec![SymbolType::SseMain, SymbolType::SzseChinext]);

        assert!(classify_all(&["sh600000", "nyse:SPY"]).is_err());
    }
}
