use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// 설정 로드 오류
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 파일 오류
    #[error("설정 파일 오류: {0}")]
    FileError(String),
    /// 파싱 오류
    #[error("설정 파싱 오류: {0}")]
    ParseError(String),
    /// 유효성 검사 오류
    #[error("설정 유효성 검사 오류: {0}")]
    ValidationError(String),
}

/// 설정 로드 결과
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 설정 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 형식
    Json,
    /// TOML 형식
    Toml,
    /// 자동 감지 (파일 확장자로부터)
    Auto,
}

/// 설정 유효성 검사 트레이트
pub trait ConfigValidation {
    /// 설정 유효성 검사
    fn validate(&self) -> ConfigResult<()>;
}

/// 설정 파일 로더
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// 파일에서 설정 로드
    ///
    /// # Arguments
    /// * `path` - 설정 파일 경로
    /// * `format` - 설정 파일 형식 (Auto면 확장자로 판단)
    ///
    /// # Returns
    /// * `ConfigResult<T>` - 검증된 설정 객체 또는 오류
    pub fn load_from_file<T>(path: &Path, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        debug!("설정 파일 로드 시작: {}", path.display());

        let format = match format {
            ConfigFormat::Auto => Self::detect_format(path)?,
            other => other,
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            error!("설정 파일 읽기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 읽기 실패: {}", e))
        })?;

        let config: T = match format {
            ConfigFormat::Json => Self::parse_json(&content)?,
            _ => Self::parse_toml(&content)?,
        };

        if let Err(e) = config.validate() {
            error!("설정 유효성 검사 실패: {}", e);
            return Err(e);
        }

        info!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 문자열에서 설정 로드
    ///
    /// Auto 형식이면 JSON을 먼저 시도한 뒤 TOML로 재시도합니다.
    pub fn load_from_string<T>(content: &str, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        let config: T = match format {
            ConfigFormat::Json => Self::parse_json(content)?,
            ConfigFormat::Toml => Self::parse_toml(content)?,
            ConfigFormat::Auto => match Self::parse_json::<T>(content) {
                Ok(config) => config,
                Err(_) => Self::parse_toml(content)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 저장
    ///
    /// Auto 형식이면 확장자를 따르고, 확장자가 없으면 TOML로 저장합니다.
    pub fn save_to_file<T>(config: &T, path: &Path, format: ConfigFormat) -> ConfigResult<()>
    where
        T: Serialize + ConfigValidation,
    {
        debug!("설정 파일 저장 시작: {}", path.display());
        config.validate()?;

        let format = match format {
            ConfigFormat::Auto => Self::detect_format(path).unwrap_or(ConfigFormat::Toml),
            other => other,
        };

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| ConfigError::ParseError(format!("JSON 직렬화 실패: {}", e)))?,
            _ => toml::to_string_pretty(config)
                .map_err(|e| ConfigError::ParseError(format!("TOML 직렬화 실패: {}", e)))?,
        };

        std::fs::write(path, &content).map_err(|e| {
            error!("설정 파일 쓰기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 쓰기 실패: {}", e))
        })?;

        info!("설정 파일 저장 완료: {}", path.display());
        Ok(())
    }

    fn parse_json<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        serde_json::from_str(content).map_err(|e| {
            warn!("JSON 파싱 실패: {}", e);
            ConfigError::ParseError(format!("JSON 파싱 실패: {}", e))
        })
    }

    fn parse_toml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        toml::from_str(content).map_err(|e| {
            warn!("TOML 파싱 실패: {}", e);
            ConfigError::ParseError(format!("TOML 파싱 실패: {}", e))
        })
    }

    /// 파일 형식 감지
    fn detect_format(path: &Path) -> ConfigResult<ConfigFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => {
                warn!("지원되지 않는 파일 형식: {}", path.display());
                Err(ConfigError::FileError(format!(
                    "파일 형식을 감지할 수 없음: {}",
                    path.display()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let json = r#"{"timeframe":"4h","atr_multiplier":1.5,"pattern":{"min_volume_strength":1.3}}"#;
        let config =
            ConfigLoader::load_from_string::<SignalConfig>(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.timeframe, "4h");
        assert_eq!(config.atr_multiplier, 1.5);
        assert_eq!(config.pattern.min_volume_strength, 1.3);
        assert_eq!(config.pattern.volume_period, 20);
        assert_eq!(config.windows.indicator, 42);
    }

    #[test]
    fn test_load_from_toml_string() {
        let toml_str = r#"
            timeframe = "15m"

            [structure]
            swing_left = 3
            min_gap_percent = 0.2

            [weights]
            choch = 2.5
        "#;
        let config =
            ConfigLoader::load_from_string::<SignalConfig>(toml_str, ConfigFormat::Auto).unwrap();
        assert_eq!(config.timeframe, "15m");
        assert_eq!(config.structure.swing_left, 3);
        assert_eq!(config.structure.swing_right, 2);
        assert_eq!(config.structure.min_gap_percent, Some(0.2));
        assert_eq!(config.weights.choch, 2.5);
    }

    #[test]
    fn test_validation_error() {
        let json = r#"{"indicator":{"macd_fast":30}}"#;
        let result = ConfigLoader::load_from_string::<SignalConfig>(json, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error() {
        let result =
            ConfigLoader::load_from_string::<SignalConfig>("{ not valid", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let mut config = SignalConfig::default();
        config.timeframe = "1d".to_string();
        config.structure.min_gap_percent = Some(0.5);

        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("signal.json");
        ConfigLoader::save_to_file(&config, &json_path, ConfigFormat::Auto).unwrap();
        let loaded_json =
            ConfigLoader::load_from_file::<SignalConfig>(&json_path, ConfigFormat::Auto).unwrap();
        assert_eq!(loaded_json, config);

        let toml_path = dir.path().join("signal.toml");
        ConfigLoader::save_to_file(&config, &toml_path, ConfigFormat::Auto).unwrap();
        let loaded_toml =
            ConfigLoader::load_from_file::<SignalConfig>(&toml_path, ConfigFormat::Auto).unwrap();
        assert_eq!(loaded_toml, config);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.yaml");
        std::fs::write(&path, "timeframe: 1h").unwrap();
        let result = ConfigLoader::load_from_file::<SignalConfig>(&path, ConfigFormat::Auto);
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
