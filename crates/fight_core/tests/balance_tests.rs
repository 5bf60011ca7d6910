//! Balance tests for fight_core.
//!
//! These run real hit exchanges through the balance harness to catch
//! tuning regressions early.

use fight_core::prelude::*;
use fight_test_utils::balance::{
    generate_ttk_table, hits_to_defeat, meter_per_hit, run_trade, ExchangeStats,
};
use fight_test_utils::fixtures::{approx_eq, fixed_f, jab};

fn heavy() -> AttackSpec {
    AttackSpec::new(fixed_f(0.25), fixed_f(0.125), fixed_f(0.0625))
}

// =============================================================================
// Time to defeat
// =============================================================================

mod time_to_defeat {
    use super::*;

    /// Blocking halves damage, so guarded fights take twice as long
    #[test]
    fn test_guard_doubles_hits_for_every_tier() {
        let table = generate_ttk_table(&DuelConfig::default(), &[("jab", jab()), ("heavy", heavy())]);

        for (name, open, guarded) in table {
            let open = open.unwrap_or_else(|| panic!("{name} never defeats"));
            let guarded = guarded.unwrap_or_else(|| panic!("{name} never defeats through guard"));
            assert_eq!(guarded, open * 2, "{name}");
        }
    }

    #[test]
    fn test_block_damage_factor_is_tunable() {
        let mut config = DuelConfig::default();
        config.player_two.meter.block_damage_factor = fixed_f(0.25);

        assert_eq!(hits_to_defeat(&config, jab(), false, 100), Some(16));
        assert_eq!(hits_to_defeat(&config, jab(), true, 100), Some(64));
    }

    #[test]
    fn test_heavy_is_four_hits() {
        assert_eq!(hits_to_defeat(&DuelConfig::default(), heavy(), false, 10), Some(4));
    }
}

// =============================================================================
// Meter
// =============================================================================

mod meter {
    use super::*;

    #[test]
    fn test_meter_scales_with_damage() {
        let config = DuelConfig::default();
        let light = meter_per_hit(&config, jab());
        let strong = meter_per_hit(&config, heavy());

        assert!(approx_eq(strong, light * 4));
        assert!(approx_eq(strong, fixed_f(0.2875)));
    }

    #[test]
    fn test_disabling_bonus_lowers_gain() {
        let mut config = DuelConfig::default();
        config.player_one.meter.opponent_hit_bonus = Fixed::ZERO;

        assert!(approx_eq(meter_per_hit(&config, heavy()), fixed_f(0.2125)));
    }
}

// =============================================================================
// Trades
// =============================================================================

mod trades {
    use super::*;

    /// A heavy trading against a jab wins despite swinging second
    #[test]
    fn test_heavy_outtrades_jab() {
        let result = run_trade(&DuelConfig::default(), jab(), heavy(), 100);

        assert_eq!(result.winner, Some(FighterId::Two));
        assert_eq!(result.hits, 8);
        assert_eq!(result.remaining_health[1], fixed_f(0.75));
        assert_eq!(result.remaining_health[0], Fixed::ZERO);
    }

    #[test]
    fn test_mirrored_matchups_balance_out() {
        let config = DuelConfig::default();
        let mut stats = ExchangeStats::default();
        stats.record(&run_trade(&config, jab(), heavy(), 100));
        stats.record(&run_trade(&config, heavy(), jab(), 100));

        assert_eq!(stats.total, 2);
        assert_eq!(stats.draws, 0);
        assert!(stats.is_balanced(0.45, 0.55));
    }

    #[test]
    fn test_short_exchange_is_a_draw() {
        let result = run_trade(&DuelConfig::default(), jab(), jab(), 4);
        assert_eq!(result.winner, None);
        assert_eq!(result.hits, 4);
    }
}
