//! Search flag resolution
//!
//! Per flag, an explicit caller value wins, then an input-dependent default,
//! then the global default from configuration.

use docsearch_core::config::DefaultSearchFlags;
use docsearch_core::search_models::SearchFlags;

/// Flags after resolution; every field is concrete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveSearchFlags {
    pub fulltext: bool,
    pub max_agg_values: u32,
    pub skip_cache: bool,
    pub skip_aggregates: bool,
    pub skip_highlighting: bool,
    pub get_suggestions: bool,
}

/// Merges caller flags with the process-wide defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagResolver {
    defaults: DefaultSearchFlags,
}

impl FlagResolver {
    pub fn new(defaults: DefaultSearchFlags) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &DefaultSearchFlags {
        &self.defaults
    }

    pub fn resolve(&self, caller: Option<&SearchFlags>, input: &str) -> EffectiveSearchFlags {
        let caller = caller.cloned().unwrap_or_default();

        EffectiveSearchFlags {
            fulltext: caller.fulltext.unwrap_or(self.defaults.fulltext),
            max_agg_values: caller.max_agg_values.unwrap_or(self.defaults.max_agg_values),
            skip_cache: caller.skip_cache.unwrap_or(self.defaults.skip_cache),
            skip_aggregates: caller.skip_aggregates.unwrap_or(self.defaults.skip_aggregates),
            skip_highlighting: caller
                .skip_highlighting
                .or_else(|| is_match_all_input(input).then_some(true))
                .unwrap_or(self.defaults.skip_highlighting),
            get_suggestions: caller
                .get_suggestions
                .or_else(|| is_match_all_input(input).then_some(false))
                .unwrap_or(self.defaults.get_suggestions),
        }
    }
}

impl Default for FlagResolver {
    fn default() -> Self {
        Self::new(DefaultSearchFlags::default())
    }
}

/// Empty or wildcard input matches everything: nothing to highlight or correct
pub fn is_match_all_input(input: &str) -> bool {
    matches!(input.trim(), "" | "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_caller_flags_uses_defaults() {
        let flags = FlagResolver::default().resolve(None, "orders");
        assert_eq!(
            flags,
            EffectiveSearchFlags {
                fulltext: false,
                max_agg_values: 20,
                skip_cache: false,
                skip_aggregates: false,
                skip_highlighting: false,
                get_suggestions: false,
            }
        );
    }

    #[test]
    fn test_explicit_caller_values_win() {
        let caller = SearchFlags::default()
            .fulltext(true)
            .max_agg_values(3)
            .skip_aggregates(true)
            .get_suggestions(true);

        let flags = FlagResolver::default().resolve(Some(&caller), "orders");
        assert!(flags.fulltext);
        assert_eq!(flags.max_agg_values, 3);
        assert!(flags.skip_aggregates);
        assert!(flags.get_suggestions);
        assert!(!flags.skip_cache);
    }

    #[test]
    fn test_empty_input_skips_highlighting_by_default() {
        let resolver = FlagResolver::default();
        assert!(resolver.resolve(None, "").skip_highlighting);
        assert!(resolver.resolve(None, "  * ").skip_highlighting);
    }

    #[test]
    fn test_explicit_highlighting_beats_input_default() {
        let caller = SearchFlags::default().skip_highlighting(false);
        let flags = FlagResolver::default().resolve(Some(&caller), "");
        assert!(!flags.skip_highlighting);
    }

    #[test]
    fn test_empty_input_disables_suggestions_unless_requested() {
        let defaults = DefaultSearchFlags {
            get_suggestions: true,
            ..DefaultSearchFlags::default()
        };
        let resolver = FlagResolver::new(defaults);
        assert!(!resolver.resolve(None, "*").get_suggestions);
        assert!(resolver.resolve(None, "ordrs").get_suggestions);

        let caller = SearchFlags::default().get_suggestions(true);
        assert!(resolver.resolve(Some(&caller), "").get_suggestions);
    }

    #[test]
    fn test_configured_defaults_apply() {
        let defaults = DefaultSearchFlags {
            fulltext: true,
            max_agg_values: 7,
            ..DefaultSearchFlags::default()
        };
        let flags = FlagResolver::new(defaults).resolve(Some(&SearchFlags::default()), "x");
        assert!(flags.fulltext);
        assert_eq!(flags.max_agg_values, 7);
    }
}
