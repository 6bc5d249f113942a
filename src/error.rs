use thiserror::Error;

/// 지표/분석 계산 오류
///
/// 캔들 단위의 기하학적 예외(몸통 0 등)는 여기에 포함되지 않습니다.
/// 그런 캔들은 각 분석기가 건너뛰고 스캔을 계속합니다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// 지표가 요구하는 최소 캔들 수보다 윈도우가 짧음
    #[error("{indicator} 계산에 필요한 캔들이 부족합니다: 필요 {required}, 실제 {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },
    /// 지원되지 않는 모드 문자열 또는 잘못된 파라미터
    #[error("잘못된 인자: {0}")]
    InvalidArgument(String),
    /// 캔들 시리즈 계약 위반 (시간 순서, 중복 타임스탬프, 음수 거래량 등)
    #[error("잘못된 캔들 시리즈: {0}")]
    InvalidSeries(String),
}

/// 지표 계산 결과
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 윈도우 길이 확인
///
/// # Arguments
/// * `indicator` - 지표 이름 (오류 메시지용)
/// * `required` - 최소 캔들 수
/// * `actual` - 실제 캔들 수
pub(crate) fn ensure_len(
    indicator: &'static str,
    required: usize,
    actual: usize,
) -> IndicatorResult<()> {
    if actual < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("RSI", 15, 15).is_ok());
        assert_eq!(
            ensure_len("RSI", 15, 14),
            Err(IndicatorError::InsufficientData {
                indicator: "RSI",
                required: 15,
                actual: 14,
            })
        );
    }
}
