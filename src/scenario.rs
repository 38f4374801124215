use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScenarioError;
use crate::models::{
    LevelupStrategy, NavigationConfig, PickupTable, SquadController, Vector2, WorldQuery,
};

/// シナリオメタデータ
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

/// シミュレーション設定
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub dt_s: f64,
    pub t_max_s: f64,
    pub seed: u64,
    #[serde(default = "default_levelup_interval")]
    pub levelup_interval_s: f64,
    /// ヒーローの移動速度（単位/秒）
    #[serde(default = "default_hero_speed")]
    pub hero_speed: f64,
}

fn default_levelup_interval() -> f64 {
    30.0
}

fn default_hero_speed() -> f64 {
    20.0
}

/// ヒーロー設定
#[derive(Debug, Deserialize, Serialize)]
pub struct HeroConfig {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub health: f64,
    pub max_health: f64,
}

/// 分隊編成
#[derive(Debug, Deserialize, Serialize)]
pub struct SquadConfig {
    pub leader: String,
    /// 編成順（評価順）
    pub roster: Vec<HeroConfig>,
}

/// 敵グループ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct MonsterConfig {
    pub kind: String,
    pub attack: f64,
    pub speed: f64,
    pub radius: f64,
    pub positions: Vec<Vector2>,
}

/// ピックアップ配置
#[derive(Debug, Deserialize, Serialize)]
pub struct PickupSpawnConfig {
    pub kind: String,
    pub positions: Vec<Vector2>,
}

/// 回復エフェクト設定
#[derive(Debug, Deserialize, Serialize)]
pub struct HealingEffectConfig {
    pub x: f64,
    pub y: f64,
    pub expires_at_s: f64,
    pub heal: f64,
    pub radius: f64,
}

/// ヒーローの離脱（スナップショットから消える時刻）
#[derive(Debug, Deserialize, Serialize)]
pub struct DepartureConfig {
    pub hero: String,
    pub time_s: f64,
}

/// レベルアップ設定
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LevelupConfig {
    #[serde(default)]
    pub strategy: LevelupStrategy,
}

/// 完全なシナリオ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub pickups: PickupTable,
    pub squad: SquadConfig,
    #[serde(default)]
    pub monsters: Vec<MonsterConfig>,
    #[serde(default)]
    pub pickup_spawns: Vec<PickupSpawnConfig>,
    #[serde(default)]
    pub healing_effects: Vec<HealingEffectConfig>,
    #[serde(default)]
    pub departures: Vec<DepartureConfig>,
    #[serde(default)]
    pub levelup: LevelupConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(path.to_path_buf(), e))?;

        Self::parse(&contents, path.to_path_buf())
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        Self::parse(contents, PathBuf::from("<inline>"))
    }

    fn parse(contents: &str, origin: PathBuf) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::Parse(origin, e))?;

        config.validate()?;

        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sim.dt_s <= 0.0 {
            return Err(invalid("dt_s must be positive"));
        }
        if self.sim.t_max_s <= 0.0 {
            return Err(invalid("t_max_s must be positive"));
        }
        if self.sim.levelup_interval_s <= 0.0 {
            return Err(invalid("levelup_interval_s must be positive"));
        }
        if self.sim.hero_speed < 0.0 {
            return Err(invalid("hero_speed must not be negative"));
        }

        let nav = &self.navigation;
        if nav.replan_interval_s <= 0.0 || nav.idle_cooldown_s <= 0.0 {
            return Err(invalid("replan intervals must be positive"));
        }
        if nav.orbit_radius < 0.0 {
            return Err(invalid("orbit_radius must not be negative"));
        }

        for rule in &self.pickups.0 {
            if !(rule.sigma > 0.0) {
                return Err(ScenarioError::Validation(format!(
                    "pickup {} sigma {} must be positive",
                    rule.kind, rule.sigma
                )));
            }
        }

        for monster in &self.monsters {
            if !(monster.radius > 0.0) {
                return Err(ScenarioError::Validation(format!(
                    "monster {} radius {} must be positive",
                    monster.kind, monster.radius
                )));
            }
        }

        // ロスターの検証は分隊編成と同じ規則を使う
        self.build_squad()?;

        for departure in &self.departures {
            if !self.squad.roster.iter().any(|h| h.id == departure.hero) {
                return Err(ScenarioError::Validation(format!(
                    "departure refers to unknown hero {}",
                    departure.hero
                )));
            }
        }

        Ok(())
    }

    /// 編成順のヒーローID
    pub fn roster_ids(&self) -> Vec<String> {
        self.squad.roster.iter().map(|h| h.id.clone()).collect()
    }

    /// シナリオの分隊を編成
    pub fn build_squad(&self) -> Result<SquadController, ScenarioError> {
        let squad = SquadController::form(
            &self.roster_ids(),
            &self.squad.leader,
            self.navigation.clone(),
            WorldQuery::new(self.pickups.clone()),
        )?;
        Ok(squad)
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.sim.dt_s);
        println!("最大時間: {:.1}秒 ({:.1}分)", self.sim.t_max_s, self.sim.t_max_s / 60.0);
        println!("シード値: {}", self.sim.seed);
        println!("正規化方針: {:?}", self.navigation.normalize);
        println!();

        println!("=== 分隊 ===");
        println!("リーダー: {}", self.squad.leader);
        for hero in &self.squad.roster {
            println!(
                "  {}: ({:.1}, {:.1}) 体力 {:.0}/{:.0}",
                hero.id, hero.x, hero.y, hero.health, hero.max_health
            );
        }
        for departure in &self.departures {
            println!("  {} は {:.1}秒 に離脱", departure.hero, departure.time_s);
        }
        println!();

        println!("=== ワールド ===");
        let total_monsters: usize = self.monsters.iter().map(|m| m.positions.len()).sum();
        println!("敵: {}体 ({}種)", total_monsters, self.monsters.len());
        let total_pickups: usize = self.pickup_spawns.iter().map(|p| p.positions.len()).sum();
        println!("ピックアップ: {}個", total_pickups);
        println!("回復エフェクト: {}個", self.healing_effects.len());
    }
}

fn invalid(message: &str) -> ScenarioError {
    ScenarioError::Validation(message.to_string())
}
