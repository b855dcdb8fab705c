use crate::core::models::{NetworkConfig, NetworkId};
use ahash::AHashMap;

/// Scans `priority` once and returns the first network whose config is
/// enabled. Entries without a config count as disabled
pub fn select_network(
    priority: &[NetworkId],
    configs: &AHashMap<NetworkId, NetworkConfig>,
) -> Option<NetworkId> {
    priority
        .iter()
        .find(|id| configs.get(*id).is_some_and(|cfg| cfg.enabled))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs(enabled: &[(&str, bool)]) -> AHashMap<NetworkId, NetworkConfig> {
        enabled
            .iter()
            .map(|(id, on)| {
                (
                    NetworkId::new(id),
                    NetworkConfig {
                        id: NetworkId::new(id),
                        enabled: *on,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn priority() -> Vec<NetworkId> {
        ["google", "mediavine", "propeller", "adsterra"]
            .into_iter()
            .map(NetworkId::new)
            .collect()
    }

    #[test]
    fn test_only_enabled_network_is_selected() {
        let cfgs = configs(&[
            ("google", false),
            ("mediavine", false),
            ("propeller", true),
            ("adsterra", false),
        ]);

        assert_eq!(select_network(&priority(), &cfgs), Some(NetworkId::new("propeller")));
    }

    #[test]
    fn test_first_enabled_in_priority_wins() {
        let cfgs = configs(&[
            ("google", false),
            ("mediavine", true),
            ("propeller", true),
            ("adsterra", true),
        ]);

        assert_eq!(select_network(&priority(), &cfgs), Some(NetworkId::new("mediavine")));
    }

    #[test]
    fn test_all_disabled_selects_none() {
        let cfgs = configs(&[
            ("google", false),
            ("mediavine", false),
            ("propeller", false),
            ("adsterra", false),
        ]);

        assert_eq!(select_network(&priority(), &cfgs), None);
    }

    #[test]
    fn test_every_enabled_combination() {
        let names = ["google", "mediavine", "propeller", "adsterra"];

        for mask in 0u8..16 {
            let flags: Vec<(&str, bool)> = names
                .iter()
                .enumerate()
                .map(|(i, n)| (*n, mask & (1 << i) != 0))
                .collect();

            let expected = flags.iter().find(|(_, on)| *on).map(|(n, _)| NetworkId::new(n));

            assert_eq!(select_network(&priority(), &configs(&flags)), expected, "mask {mask}");
        }
    }

    #[test]
    fn test_unconfigured_priority_entry_is_skipped() {
        let cfgs = configs(&[("adsterra", true)]);
        assert_eq!(select_network(&priority(), &cfgs), Some(NetworkId::new("adsterra")));
    }
}
