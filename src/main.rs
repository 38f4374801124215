use clap::{Arg, Command};
use tracing::info;

use squadsim::logging::{LogConfig, LogOutput, init_logging, parse_log_level};
use squadsim::models::*;
use squadsim::scenario::ScenarioConfig;
use squadsim::simulation::SimulationEngine;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("squadsim")
        .version("0.1.0")
        .about("分隊ナビゲーションシミュレーション (Squad Navigation Simulation)")
        .long_about("ポテンシャル場による操舵とリーダー継承を備えた分隊AIを\n\
                     シナリオに沿って時間駆動で再生します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("demo")
        )
        .arg(
            Arg::new("demo")
                .short('d')
                .long("demo")
                .action(clap::ArgAction::SetTrue)
                .help("組み込みの継承デモを実行")
                .conflicts_with("info")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .default_value("console")
                .value_parser(|s: &str| s.parse::<LogOutput>())
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");
    let log_config = LogConfig {
        level: parse_log_level(
            matches
                .get_one::<String>("log-level")
                .map(String::as_str)
                .unwrap_or("info"),
        ),
        output: matches.get_one::<LogOutput>("log-output").copied().unwrap_or(LogOutput::Console),
        ..LogConfig::default()
    }
    .with_verbosity(verbose_level);

    let _guard = match init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    println!("分隊ナビゲーションシミュレーション - squadsim v0.1.0");
    println!();

    if matches.get_flag("demo") {
        println!("=== リーダー継承デモ ===");
        if let Err(e) = run_demo() {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        if let Err(e) = run_scenario(scenario_path, matches.get_flag("info"), verbose_level) {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    } else {
        show_default_help();
    }
}

/// 5名の分隊でリーダーが消えた場合の継承を確認する
fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let roster: Vec<String> = ["alaric", "kaelen", "garron", "isolde", "lyra"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut squad = SquadController::form(
        &roster,
        "alaric",
        NavigationConfig::default(),
        WorldQuery::default(),
    )?;

    let mut world = WorldSnapshot::default();
    for (i, id) in roster.iter().enumerate() {
        world.teammates.insert(
            id.clone(),
            TeammateInfo {
                position: Vector2::new(i as f64 * 3.0, 0.0),
                health: 100.0,
                max_health: 100.0,
            },
        );
    }
    world.pickups.insert(
        "treasure".to_string(),
        PickupGroup { positions: vec![Vector2::new(60.0, 40.0)] },
    );

    for (t, label) in [(6.0, "通常"), (6.1, "alaric 離脱")] {
        if t > 6.0 {
            world.teammates.remove("alaric");
        }
        println!("--- 時刻 {:.1}秒 ({}) ---", t, label);
        for (id, intent) in squad.tick(t, 0.1, &world) {
            println!("  {:<8} {:?}", id, intent);
        }
        println!("  リーダー: {}", squad.leader_id());
    }

    for event in squad.successions() {
        info!("継承: {} → {} ({:.1}秒)", event.former_leader, event.new_leader, event.time);
    }
    Ok(())
}

/// シナリオファイルを読み込んで実行
fn run_scenario(
    scenario_path: &str,
    info_only: bool,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;

    if verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    scenario.print_summary();
    println!();
    if info_only {
        return Ok(());
    }

    let mut simulation = SimulationEngine::new(scenario, verbose_level)?;
    let report = simulation.run();

    println!("=== 結果 ===");
    println!("ステップ数: {}", report.steps);
    println!("終了時刻: {:.1}秒", report.final_time);
    println!("最終リーダー: {}", report.final_leader);
    for event in &report.successions {
        println!("  継承 {:.1}秒: {} → {}", event.time, event.former_leader, event.new_leader);
    }
    for (i, levelup) in report.levelups.iter().enumerate() {
        println!("  レベルアップ{}: {} {:?}", i + 1, levelup.hero, levelup.option);
    }

    Ok(())
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  squadsim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>   シナリオファイルを指定して実行");
    println!("  -i, --info              シナリオ情報のみ表示");
    println!("  -d, --demo              組み込みの継承デモを実行");
    println!("      --log-level <LEVEL> ログレベル");
    println!("      --log-output <OUT>  ログ出力先 (console, file, both)");
    println!("  -v, --verbose           詳細出力 (複数指定で詳細レベル上昇)");
    println!("  -h, --help              このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/scenario_basic.yaml        - 基本テスト用");
    println!("  scenarios/scenario_leader_loss.yaml  - リーダー離脱と回復");
    println!();
    println!("例:");
    println!("  squadsim -s scenarios/scenario_basic.yaml -v");
    println!("  squadsim -s scenarios/scenario_leader_loss.yaml -i");
    println!("  squadsim --demo");
}
