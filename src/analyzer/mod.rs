// 신호 분석기 모듈
// 지표, 캔들 패턴, 시장 구조를 각각 힘 합계로 바꾸고 하나의 신호로 합칩니다.

pub mod base;
pub mod candle_pattern_analyzer;
pub mod indicator_analyzer;
pub mod market_structure_analyzer;
pub mod signal_strength_analyzer;

pub use base::{ForceAnalyzer, ForceTally};
pub use candle_pattern_analyzer::{CandlePattern, CandlePatternAnalyzer, PatternEvent};
pub use indicator_analyzer::{IndicatorAnalyzer, IndicatorScore};
pub use market_structure_analyzer::{
    MarketStructureAnalyzer, StructureEvent, StructureEventType, StructureScan, SwingPoint,
    find_swing_points,
};
pub use signal_strength_analyzer::{SignalBreakdown, SignalStrengthAnalyzer, fuse};
