use log::{debug, error, info, warn};
use market_signal::analyzer::SignalStrengthAnalyzer;
use market_signal::candle::{Candle, CandleSeries, OhlcvCandle};
use market_signal::config::SignalConfig;
use market_signal::config_loader::{ConfigFormat, ConfigLoader};
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    // 로그 초기화
    env_logger::init();

    info!("신호 리포트 시작");

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 캔들 파일 경로가 필요합니다.");
        println!("사용법: {} <캔들_JSON_파일> [설정_파일_경로(.json|.toml)]", args[0]);
        println!("캔들 파일 형식: [[timestamp, open, high, low, close, volume], ...]");
        process::exit(1);
    }

    let config = match args.get(2).map(PathBuf::from) {
        Some(path) => {
            debug!("사용자 지정 설정 파일 사용: {}", path.display());
            match ConfigLoader::load_from_file::<SignalConfig>(&path, ConfigFormat::Auto) {
                Ok(config) => config,
                Err(e) => {
                    error!("설정 로드 실패: {}", e);
                    println!("설정 로드 실패: {}", e);
                    process::exit(1);
                }
            }
        }
        None => {
            warn!("설정 파일이 지정되지 않아 기본 설정을 사용합니다");
            SignalConfig::default()
        }
    };

    let candle_path = PathBuf::from(&args[1]);
    let content = match std::fs::read_to_string(&candle_path) {
        Ok(content) => content,
        Err(e) => {
            error!("캔들 파일 읽기 실패: {} - {}", candle_path.display(), e);
            println!("캔들 파일 읽기 실패: {}", e);
            process::exit(1);
        }
    };

    let candles: Vec<OhlcvCandle> = match serde_json::from_str(&content) {
        Ok(candles) => candles,
        Err(e) => {
            error!("캔들 JSON 파싱 실패: {}", e);
            println!("캔들 JSON 파싱 실패: {}", e);
            process::exit(1);
        }
    };
    info!("캔들 {}개 로드 완료", candles.len());

    if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
        println!("구간: {} ~ {}", first.datetime(), last.datetime());
    }

    if candles.len() < config.required_candles() {
        warn!(
            "캔들 수({})가 권장 윈도우({})보다 적습니다",
            candles.len(),
            config.required_candles()
        );
    }

    let result = CandleSeries::new(candles).and_then(|series| {
        let analyzer = SignalStrengthAnalyzer::<OhlcvCandle>::from_config(&config)?;
        analyzer.analyze_detailed(&series)
    });

    match result {
        Ok(breakdown) => {
            println!("타임프레임: {}", config.timeframe);
            println!("{}", breakdown);

            let (confidence, strength, actual_movement, direction) = breakdown.result.as_tuple();
            println!(
                "({:.2}, {:.2}, {}, {})",
                confidence, strength, actual_movement, direction
            );

            match serde_json::to_string_pretty(&breakdown.result) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("결과 JSON 직렬화 실패: {}", e),
            }
            info!("신호 리포트 완료");
        }
        Err(e) => {
            error!("신호 계산 실패: {}", e);
            println!("신호 계산 실패: {}", e);
            process::exit(1);
        }
    }
}
