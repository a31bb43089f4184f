//! Resolves the index a feeder fund tracks from the fund's display name.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Index display names and the quote symbol used as their proxy.
///
/// Several names intentionally share a symbol, and a few entries point at symbols of a
/// neighbouring sector. Entries are kept as listed.
const INDEX_ALIASES: &[(&str, &str)] = &[
    // Broad market
    ("沪深300", "sh000300"),
    ("中证500", "sh000905"),
    ("上证50", "sh000016"),
    ("创业板指", "sz399006"),
    ("深证成指", "sz399001"),
    ("中证1000", "sh000852"),
    ("科创50", "sh000688"),
    ("上证指数", "sh000001"),
    ("深证100", "sz399330"),
    ("中证800", "sh000906"),
    ("中证200", "sh000904"),
    ("中证100", "sh000903"),
    ("中证全指", "sh000985"),
    ("中证A股", "sh000985"),
    ("中证流通", "sh000902"),
    // Sector
    ("中证白酒", "sz399997"),
    ("中证医疗", "sz399989"),
    ("中证医药", "sh000933"),
    ("中证新能", "sh399808"),
    ("中证军工", "sh399967"),
    ("中证传媒", "sh399971"),
    ("中证计算机", "sh399935"),
    ("中证电子", "sh399811"),
    ("中证半导体", "sh399673"),
    ("中证芯片", "sh399673"),
    ("中证5G通信", "sh399994"),
    ("中证人工智能", "sh399971"),
    ("中证大数据", "sh399415"),
    ("中证云计算", "sh399413"),
    ("中证区块链", "sh399254"),
    ("中证金融科技", "sh399699"),
    ("中证银行", "sh399986"),
    ("中证证券", "sh399975"),
    ("券商", "sh399975"),
    ("证券", "sh399975"),
    ("中证保险", "sh399809"),
    ("中证地产", "sh399983"),
    ("中证有色", "sh399805"),
    ("中证煤炭", "sh399998"),
    ("中证钢铁", "sh399969"),
    ("中证基建", "sh399995"),
    ("中证农业", "sh399986"),
    ("中证消费", "sh399977"),
    ("中证红利", "sh000922"),
    ("中证环保", "sh399806"),
    ("中证TMT", "sh399998"),
    ("中证互联网", "sh399677"),
    ("中证游戏", "sh399418"),
    ("中证动漫游戏", "sh930901"),
    ("中证影视", "sh399418"),
    ("中证科技50策略", "sh000931"),
    ("中证科技", "sh000931"),
    ("中证科技50", "sh000931"),
    // Theme
    ("中证新能源车", "sh399976"),
    ("中证新能源", "sh399808"),
    ("中证光伏", "sh399618"),
    ("中证稀土", "sh399715"),
    ("中证创新药", "sh931152"),
    ("中证医疗器械", "sh931152"),
    ("中证生物科技", "sh399993"),
    ("中证养老", "sh399993"),
    ("中证食品饮料", "sh399996"),
    ("中证家用电器", "sh399996"),
    // Hong Kong
    ("恒生指数", "r_hkHSI"),
    ("恒生科技", "r_hkHSTECH"),
    ("恒生国企", "r_hkHSCEI"),
    ("恒生医疗", "r_hkHSHKI"),
    ("恒生消费", "r_hkHSCSI"),
    ("恒生互联网", "r_hkHSIII"),
    ("港股通新经济", "r_hkHSNEI"),
    // US indices, proxied by their ETFs
    ("纳斯达克100", "s_usQQQ"),
    ("纳斯达克", "s_usQQQ"),
    ("纳斯达克综合", "s_usQQQ"),
    ("标普500", "s_usSPY"),
    ("标普500指数", "s_usSPY"),
    ("道琼斯", "s_usDIA"),
    ("道琼斯工业", "s_usDIA"),
    ("道琼斯指数", "s_usDIA"),
    ("罗素2000", "s_usIWM"),
    // China internet, proxied by KWEB
    ("中概互联网", "s_usKWEB"),
    ("中国互联网", "s_usKWEB"),
    ("中证海外中国互联网", "s_usKWEB"),
    ("中国互联", "s_usKWEB"),
    ("中概股", "s_usKWEB"),
];

static GLOBAL: LazyLock<IndexResolver> = LazyLock::new(|| IndexResolver::new(INDEX_ALIASES));

/// Read-only lookup from index display names to quote symbols.
#[derive(Debug)]
pub struct IndexResolver {
    codes: HashMap<&'static str, &'static str>,
    /// Alias names ordered by descending character count, ties in table order.
    by_length: Vec<&'static str>,
}

impl IndexResolver {
    pub fn new(aliases: &[(&'static str, &'static str)]) -> Self {
        let mut codes = HashMap::with_capacity(aliases.len());
        let mut by_length = Vec::with_capacity(aliases.len());
        for (name, code) in aliases {
            if codes.insert(*name, *code).is_none() {
                by_length.push(*name);
            }
        }
        by_length.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
        Self { codes, by_length }
    }

    /// The process-wide resolver over the built-in alias table.
    pub fn global() -> &'static IndexResolver {
        &GLOBAL
    }

    /// Finds the longest registered index name contained in `fund_name`.
    pub fn extract_index_name(&self, fund_name: &str) -> Option<&'static str> {
        if fund_name.is_empty() {
            return None;
        }
        self.by_length
            .iter()
            .find(|name| fund_name.contains(*name))
            .copied()
    }

    pub fn resolve_code(&self, name: &str) -> Option<&'static str> {
        self.codes.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_alias_wins() {
        let resolver = IndexResolver::global();
        // Both "纳斯达克" (4 chars) and "纳斯达克100" (7 chars) are present.
        assert_eq!(
            resolver.extract_index_name("某纳斯达克100ETF联接(QDII)A"),
            Some("纳斯达克100")
        );
        assert_eq!(
            resolver.extract_index_name("某中证新能源车ETF联接C"),
            Some("中证新能源车")
        );
        assert_eq!(
            resolver.extract_index_name("某中证海外中国互联网ETF联接"),
            Some("中证海外中国互联网")
        );
    }

    #[test]
    fn test_equal_length_ties_follow_table_order() {
        let resolver = IndexResolver::new(&[("AAAB", "x1"), ("AABB", "x2"), ("AA", "x3")]);
        assert_eq!(resolver.extract_index_name("..AABB..AAAB.."), Some("AAAB"));
        assert_eq!(resolver.extract_index_name("..AA.."), Some("AA"));
    }

    #[test]
    fn test_no_alias_in_name() {
        let resolver = IndexResolver::global();
        assert_eq!(resolver.extract_index_name("某价值精选混合A"), None);
        assert_eq!(resolver.extract_index_name(""), None);
    }

    #[test]
    fn test_resolve_code() {
        let resolver = IndexResolver::global();
        assert_eq!(resolver.resolve_code("沪深300"), Some("sh000300"));
        assert_eq!(resolver.resolve_code("恒生科技"), Some("r_hkHSTECH"));
        assert_eq!(resolver.resolve_code("不存在的指数"), None);
    }

    #[test]
    fn test_many_to_one_aliases_are_preserved() {
        let resolver = IndexResolver::global();
        assert_eq!(resolver.len(), INDEX_ALIASES.len());
        for name in ["券商", "证券", "中证证券"] {
            assert_eq!(resolver.resolve_code(name), Some("sh399975"));
        }
        for name in ["中证科技", "中证科技50", "中证科技50策略"] {
            assert_eq!(resolver.resolve_code(name), Some("sh000931"));
        }
    }

    // Known-ambiguous entries: these targets do not match the theme named by the alias.
    // They are asserted as-is so any change to them is deliberate.
    #[test]
    fn test_known_ambiguous_aliases_are_kept_literally() {
        let resolver = IndexResolver::global();
        assert_eq!(
            resolver.resolve_code("中证人工智能"),
            resolver.resolve_code("中证传媒")
        );
        assert_eq!(resolver.resolve_code("中证农业"), Some("sh399986"));
        assert_eq!(resolver.resolve_code("中证银行"), Some("sh399986"));
        assert_eq!(resolver.resolve_code("中证TMT"), Some("sh399998"));
        assert_eq!(resolver.resolve_code("中证养老"), Some("sh399993"));
    }

    #[test]
    fn test_substring_alias_inside_unrelated_name() {
        // "证券" is an alias on its own, so any name mentioning it resolves to the broker index.
        let resolver = IndexResolver::global();
        assert_eq!(resolver.extract_index_name("某证券公司ETF联接"), Some("证券"));
    }
}
