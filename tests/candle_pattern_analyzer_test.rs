use common_test_utils::*;

use market_signal::analyzer::base::ForceAnalyzer;
use market_signal::analyzer::candle_pattern_analyzer::{
    CandlePattern, CandlePatternAnalyzer, PatternEvent,
};

/// 이전 캔들 + 거래량이 3배인 현재 캔들 (거래량 강도 1.5)
fn pair(prev: (f64, f64, f64, f64), curr: (f64, f64, f64, f64)) -> Vec<TestCandle> {
    vec![
        candle_at(0, prev.0, prev.1, prev.2, prev.3, 1000.0),
        candle_at(1, curr.0, curr.1, curr.2, curr.3, 3000.0),
    ]
}

fn single_event(data: &[TestCandle]) -> PatternEvent {
    let events = CandlePatternAnalyzer::default().analyze(data);
    assert_eq!(events.len(), 1, "events: {:?}", events);
    events[0]
}

#[test]
fn test_bullish_engulfing() {
    let data = pair((101.0, 101.2, 99.8, 100.0), (99.5, 102.6, 99.4, 102.5));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::BullishEngulfing);
    assert_eq!(event.index, 1);
    assert_eq!(event.multiplicator, 3.0);
    assert_eq!(event.volume_strength, 1.5);
}

#[test]
fn test_bearish_engulfing() {
    let data = pair((100.0, 101.2, 99.8, 101.0), (101.5, 101.6, 98.4, 98.5));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::BearishEngulfing);
    assert_eq!(event.multiplicator, -3.0);
}

#[test]
fn test_hammer_like() {
    let data = pair((101.0, 101.2, 99.8, 100.0), (100.0, 101.5, 97.0, 101.0));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::HammerLike);
    assert_eq!(event.multiplicator, 3.0);
}

#[test]
fn test_shooting_star_like() {
    let data = pair((100.0, 101.2, 99.8, 101.0), (101.0, 103.0, 99.7, 100.0));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::ShootingStarLike);
    assert_eq!(event.multiplicator, -2.0);
}

#[test]
fn test_dragonfly_takes_priority_over_hammer() {
    let data = pair((101.0, 101.2, 99.8, 100.0), (100.0, 100.55, 98.0, 100.5));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::DragonflyDoji);
    assert_eq!(event.multiplicator, 4.0);
}

#[test]
fn test_doji_star_signed_by_current_candle() {
    let data = pair((100.0, 104.5, 99.5, 104.0), (104.5, 107.0, 102.0, 104.0));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::DojiStar);
    assert!((event.multiplicator + 1.125).abs() < 1e-9);
}

#[test]
fn test_flat_doji_star_counts_as_bearish() {
    let data = pair((100.0, 104.5, 99.5, 104.0), (104.0, 107.0, 102.0, 104.0));
    let event = single_event(&data);

    assert_eq!(event.pattern, CandlePattern::DojiStar);
    // 꼬리 합 5 / 이전 몸통 4
    assert_eq!(event.multiplicator, -1.25);

    let tally = CandlePatternAnalyzer::default().tally(&data).unwrap();
    assert_eq!(tally.bearish, 1.875);
    assert_eq!(tally.bullish_count, 0);
    assert_eq!(tally.bearish_count, 1);
}

#[test]
fn test_momentum_candle() {
    let mut data: Vec<TestCandle> = (0..4)
        .map(|j| {
            let base = 100.0 + j as f64;
            candle_at(j, base, base + 1.2, base - 0.2, base + 1.0, 1000.0)
        })
        .collect();
    data.push(candle_at(4, 104.0, 111.2, 103.8, 111.0, 3000.0));

    let event = single_event(&data);
    assert_eq!(event.pattern, CandlePattern::MomentumCandle);
    assert_eq!(event.index, 4);
    assert!((event.multiplicator - 7.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_low_volume_candles_are_skipped() {
    let data = vec![
        candle_at(0, 101.0, 101.2, 99.8, 100.0, 1000.0),
        candle_at(1, 99.5, 102.6, 99.4, 102.5, 1000.0),
    ];
    assert!(CandlePatternAnalyzer::default().analyze(&data).is_empty());
}

#[test]
fn test_zero_body_previous_candle_is_skipped() {
    let data = pair((100.0, 100.5, 99.5, 100.0), (99.5, 102.6, 99.4, 102.5));
    assert!(CandlePatternAnalyzer::default().analyze(&data).is_empty());
}

#[test]
fn test_multiplicator_is_clamped() {
    let data = pair((100.0, 100.2, 99.9, 100.1), (100.1, 110.2, 99.9, 110.1));
    // 이전 몸통 0.1, 현재 몸통 10 → 배수 100이지만 둘 다 양봉이라 모멘텀/엔걸핑 아님
    let events = CandlePatternAnalyzer::default().analyze(&data);
    assert!(events.iter().all(|e| e.multiplicator.abs() <= 25.0));

    let data = pair((100.1, 100.2, 99.9, 100.0), (99.9, 110.2, 99.8, 110.1));
    let event = single_event(&data);
    assert_eq!(event.pattern, CandlePattern::BullishEngulfing);
    assert_eq!(event.multiplicator, 25.0);
}

#[test]
fn test_tally_uses_capped_volume_strength() {
    let data = pair((101.0, 101.2, 99.8, 100.0), (99.5, 102.6, 99.4, 102.5));
    let analyzer = CandlePatternAnalyzer::default();
    let tally = analyzer.tally(&data).unwrap();

    assert_eq!(tally.bullish, 4.5);
    assert_eq!(tally.bearish, 0.0);
    assert_eq!(tally.bullish_count, 1);
    assert_eq!(tally.bearish_count, 0);
}

#[test]
fn test_tally_tail_uses_window() {
    let mut data = create_uptrend_candles(30, 100.0, 2.0);
    // 윈도우 밖의 엔걸핑은 무시되어야 함
    data[1] = candle_at(1, 101.0, 103.0, 99.0, 100.5, 1000.0);
    data[2] = candle_at(2, 100.0, 108.0, 99.0, 107.0, 5000.0);
    let analyzer = CandlePatternAnalyzer::default();
    assert_eq!(ForceAnalyzer::<TestCandle>::window(&analyzer), 14);

    let tally = analyzer.tally_tail(&data).unwrap();
    assert_eq!(tally.bullish_count + tally.bearish_count, 0);
}
