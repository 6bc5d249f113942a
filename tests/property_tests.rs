//! 점수 계산 불변식에 대한 프로퍼티 테스트
//!
//! 1. 배수 제한은 멱등이며 항상 [-25, 25] 범위
//! 2. 0-100 스케일은 범위를 벗어나지 않고 |값|에 대해 단조
//! 3. 결합 결과는 항상 0-100이며 신뢰도 0이면 중립
//! 4. 임의 캔들에서도 패턴/구조 이벤트 배수는 제한 범위 안

use common_test_utils::*;

use market_signal::analyzer::base::ForceTally;
use market_signal::analyzer::candle_pattern_analyzer::CandlePatternAnalyzer;
use market_signal::analyzer::market_structure_analyzer::MarketStructureAnalyzer;
use market_signal::analyzer::signal_strength_analyzer::fuse;
use market_signal::indicator::utils::{MULTIPLIER_LIMIT, clamp_multiplier, scale_0_100};
use market_signal::model::MarketDirection;
use proptest::prelude::*;

fn arb_candles() -> impl Strategy<Value = Vec<TestCandle>> {
    prop::collection::vec(
        (
            50.0..150.0_f64,
            50.0..150.0_f64,
            0.0..5.0_f64,
            0.0..5.0_f64,
            100.0..5000.0_f64,
        ),
        0..60,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (open, close, up, down, volume))| {
                candle_at(
                    i,
                    open,
                    open.max(close) + up,
                    open.min(close) - down,
                    close,
                    volume,
                )
            })
            .collect()
    })
}

fn arb_tally() -> impl Strategy<Value = ForceTally> {
    (0.0..100.0_f64, 0.0..100.0_f64, 0..10_usize, 0..10_usize).prop_map(
        |(bullish, bearish, bullish_count, bearish_count)| ForceTally {
            bullish,
            bearish,
            bullish_count,
            bearish_count,
        },
    )
}

proptest! {
    #[test]
    fn clamp_is_idempotent_and_bounded(value in -1000.0..1000.0_f64) {
        let once = clamp_multiplier(value);
        prop_assert_eq!(clamp_multiplier(once), once);
        prop_assert!(once.abs() <= MULTIPLIER_LIMIT);
    }

    #[test]
    fn scale_is_bounded_and_monotonic(a in -500.0..500.0_f64, b in -500.0..500.0_f64, max in 0.001..1000.0_f64) {
        let sa = scale_0_100(a, max);
        let sb = scale_0_100(b, max);
        prop_assert!((0.0..=100.0).contains(&sa));
        if a.abs() <= b.abs() {
            prop_assert!(sa <= sb);
        }
        prop_assert_eq!(scale_0_100(0.0, max), 0.0);
        prop_assert_eq!(scale_0_100(max, max), 100.0);
    }

    #[test]
    fn scale_with_non_positive_max_is_zero(value in -500.0..500.0_f64, max in -10.0..=0.0_f64) {
        prop_assert_eq!(scale_0_100(value, max), 0.0);
    }

    #[test]
    fn fuse_outputs_stay_in_range(
        indicator in arb_tally(),
        pattern in arb_tally(),
        structure in arb_tally(),
    ) {
        let indicator = ForceTally { bullish_count: 0, bearish_count: 0, ..indicator };
        let result = fuse(&indicator, MarketDirection::Neutral, &pattern, &structure);

        prop_assert!((0.0..=100.0).contains(&result.confidence));
        prop_assert!((0.0..=100.0).contains(&result.strength));
        if result.confidence == 0.0 {
            prop_assert_eq!(result.direction, MarketDirection::Neutral);
        }
    }

    #[test]
    fn detector_multiplicators_are_bounded(candles in arb_candles()) {
        let patterns = CandlePatternAnalyzer::default().analyze(&candles);
        for event in &patterns {
            prop_assert!(event.multiplicator.abs() <= MULTIPLIER_LIMIT);
            prop_assert!(event.index >= 1 && event.index < candles.len());
        }

        let scan = MarketStructureAnalyzer::default().scan(&candles);
        for event in &scan.events {
            prop_assert!((0.0..=MULTIPLIER_LIMIT).contains(&event.multiplicator));
        }
    }
}
