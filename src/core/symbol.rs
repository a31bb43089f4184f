//! Maps disclosed security codes onto the quote provider's symbol scheme.

use serde::{Deserialize, Serialize};

/// Fund name fragments that mark a fund as investing in Hong Kong or overseas markets.
const OVERSEAS_KEYWORDS: [&str; 10] = [
    "港", "恒生", "QDII", "海外", "互联网", "科技", "Nasdaq", "标普", "美股", "全球",
];

/// A raw disclosed security code paired with its provider symbol.
///
/// The symbol is derived once at construction from the raw code and the owning fund's
/// name, and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCode {
    raw: String,
    symbol: String,
}

impl SecurityCode {
    pub fn new(raw: &str, fund_name: &str) -> Self {
        Self {
            raw: raw.to_string(),
            symbol: normalize(raw, fund_name),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

pub fn is_overseas_fund(fund_name: &str) -> bool {
    OVERSEAS_KEYWORDS.iter().any(|kw| fund_name.contains(kw))
}

/// Converts a raw security code into a provider symbol such as `sh600519`,
/// `r_hk00700` or `s_usQQQ`.
///
/// Codes that are neither all digits nor all letters are returned unchanged; the quote
/// lookup for them will simply miss.
pub fn normalize(raw_code: &str, fund_name: &str) -> String {
    let trimmed = raw_code.trim();
    let code = trimmed.split('.').next().unwrap_or(trimmed);

    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        if is_overseas_fund(fund_name) && code.len() <= 5 {
            return format!("r_hk{code:0>5}");
        }
        let full = format!("{code:0>6}");
        let prefix = match full.as_bytes()[0] {
            b'6' | b'9' => "sh",
            b'0' | b'3' => "sz",
            b'4' | b'8' => "bj",
            _ => "sz",
        };
        return format!("{prefix}{full}");
    }

    if !code.is_empty() && code.chars().all(|c| c.is_alphabetic()) {
        return format!("s_us{}", code.to_uppercase());
    }

    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainland_codes_are_prefixed_by_exchange() {
        assert_eq!(normalize("600519", "某白酒主题基金"), "sh600519");
        assert_eq!(normalize("900901", "某主题基金"), "sh900901");
        assert_eq!(normalize("000858", "某白酒主题基金"), "sz000858");
        assert_eq!(normalize("300750", "某新能源基金"), "sz300750");
        assert_eq!(normalize("430047", "某精选基金"), "bj430047");
        assert_eq!(normalize("830799", "某精选基金"), "bj830799");
        assert_eq!(normalize("123456", "某精选基金"), "sz123456");
    }

    #[test]
    fn test_short_codes_are_zero_padded() {
        assert_eq!(normalize("1", "某混合基金"), "sz000001");
        assert_eq!(normalize("858", "某混合基金"), "sz000858");
    }

    #[test]
    fn test_overseas_fund_short_codes_map_to_hong_kong() {
        assert_eq!(normalize("00700", "恒生科技ETF联接基金"), "r_hk00700");
        assert_eq!(normalize("700", "某港股通基金"), "r_hk00700");
        // Six-digit codes in an overseas fund still resolve to mainland exchanges.
        assert_eq!(normalize("600519", "某QDII基金"), "sh600519");
    }

    #[test]
    fn test_alphabetic_codes_map_to_us_market() {
        assert_eq!(normalize("QQQ", "纳指100ETF联接"), "s_usQQQ");
        assert_eq!(normalize("aapl", "某全球基金"), "s_usAAPL");
    }

    #[test]
    fn test_exchange_suffix_is_stripped() {
        assert_eq!(normalize("600519.SH", "某白酒主题基金"), "sh600519");
        assert_eq!(normalize("0700.HK", "某海外基金"), "r_hk00700");
    }

    #[test]
    fn test_unclassifiable_codes_are_returned_unchanged() {
        assert_eq!(normalize("BRK-B", "某美股基金"), "BRK-B");
        assert_eq!(normalize("A1B2", "某基金"), "A1B2");
    }

    #[test]
    fn test_security_code_keeps_raw_and_symbol() {
        let code = SecurityCode::new("00700", "某港股基金");
        assert_eq!(code.raw(), "00700");
        assert_eq!(code.symbol(), "r_hk00700");
    }
}
